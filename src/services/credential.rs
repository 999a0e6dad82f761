//! Provider credentials and request authorization
//!
//! DeepSeek takes its API key as a plain bearer token. Zhipu keys have the
//! form `<key id>.<secret>`; the secret never leaves the process and each
//! request instead carries a short-lived HS256 token signed with it.

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::{HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{AuthScheme, ProviderConfig, ProviderId};
use crate::services::relay::RelayError;

/// Lifetime of a signed token, in milliseconds
pub const TOKEN_TTL_MS: i64 = 60 * 60 * 1000;

/// Separator between key id and secret in a Zhipu API key
pub const KEY_DELIMITER: char = '.';

/// Claims of a signed provider token
///
/// Timestamps are milliseconds since the epoch, as the Zhipu API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub api_key: String,
    pub exp: i64,
    pub timestamp: i64,
}

/// Key id and secret of a signed-token provider
#[derive(Clone)]
pub struct SigningKey {
    key_id: String,
    secret: String,
}

impl SigningKey {
    /// Split `<key id>.<secret>`; exactly one delimiter with non-empty parts
    pub fn parse(provider: ProviderId, raw: &str) -> Result<Self, RelayError> {
        let mut parts = raw.trim().split(KEY_DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key_id), Some(secret), None) if !key_id.is_empty() && !secret.is_empty() => {
                Ok(Self {
                    key_id: key_id.to_string(),
                    secret: secret.to_string(),
                })
            }
            _ => Err(RelayError::Configuration(format!(
                "{} must have the form <id>{}<secret>",
                provider.api_key_env(),
                KEY_DELIMITER
            ))),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign a token issued now
    pub fn sign(&self) -> Result<String, RelayError> {
        self.sign_at(Utc::now())
    }

    /// Sign a token issued at `issued_at`, valid for one hour
    pub fn sign_at(&self, issued_at: DateTime<Utc>) -> Result<String, RelayError> {
        let timestamp = issued_at.timestamp_millis();
        let claims = TokenClaims {
            api_key: self.key_id.clone(),
            exp: timestamp + TOKEN_TTL_MS,
            timestamp,
        };

        // Zhipu's own SDKs also set `sign_type: "SIGN"` in the header;
        // `jsonwebtoken::Header` has no room for extra fields, and the API
        // accepts the standard header.
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| RelayError::Configuration(format!("failed to sign API token: {}", e)))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// How a request to one provider is authorized
#[derive(Clone)]
pub enum Credential {
    /// Ready-made `Bearer <api key>` header value
    Bearer(HeaderValue),
    SignedToken(SigningKey),
}

impl Credential {
    /// Resolve the credential of `provider`
    ///
    /// Fails with a configuration error when the key is absent, cannot be
    /// sent as a header value or, for signed-token providers, is malformed.
    pub fn resolve(provider: &ProviderConfig) -> Result<Self, RelayError> {
        let raw = provider.api_key().ok_or_else(|| {
            RelayError::Configuration(format!("{} is not configured", provider.id.api_key_env()))
        })?;

        match provider.auth {
            AuthScheme::Bearer => {
                let value = header_value(&format!("Bearer {}", raw)).map_err(|_| {
                    RelayError::Configuration(format!(
                        "{} contains characters not allowed in an HTTP header",
                        provider.id.api_key_env()
                    ))
                })?;
                Ok(Credential::Bearer(value))
            }
            AuthScheme::SignedToken => {
                Ok(Credential::SignedToken(SigningKey::parse(provider.id, raw)?))
            }
        }
    }

    /// Value of the `Authorization` header for one request
    pub fn authorization(&self) -> Result<HeaderValue, RelayError> {
        match self {
            Credential::Bearer(value) => Ok(value.clone()),
            Credential::SignedToken(key) => header_value(&key.sign()?).map_err(|e| {
                RelayError::Configuration(format!("signed API token is not a valid header: {}", e))
            }),
        }
    }

    /// Attach the authorization header to an outbound request
    pub fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, RelayError> {
        Ok(request.header(AUTHORIZATION, self.authorization()?))
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(raw)?;
    value.set_sensitive(true);
    Ok(value)
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credential::SignedToken(key) => f.debug_tuple("SignedToken").field(key).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    fn zhipu(key: Option<&str>) -> ProviderConfig {
        ProviderConfig::new(ProviderId::Zhipu, key.map(String::from))
    }

    #[test]
    fn test_parse_signing_key() {
        let key = SigningKey::parse(ProviderId::Zhipu, "my-id.my-secret").unwrap();
        assert_eq!(key.key_id(), "my-id");
    }

    #[test]
    fn test_parse_rejects_missing_delimiter() {
        let err = SigningKey::parse(ProviderId::Zhipu, "no-delimiter").unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(err.to_string().contains("ZHIPU_API_KEY"));
    }

    #[test]
    fn test_parse_rejects_extra_delimiter() {
        assert!(SigningKey::parse(ProviderId::Zhipu, "a.b.c").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(SigningKey::parse(ProviderId::Zhipu, ".secret").is_err());
        assert!(SigningKey::parse(ProviderId::Zhipu, "id.").is_err());
    }

    #[test]
    fn test_signed_token_claims() {
        let key = SigningKey::parse(ProviderId::Zhipu, "my-id.my-secret").unwrap();
        let issued_at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let token = key.sign_at(issued_at).unwrap();

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);

        // Millisecond expiry is far beyond any seconds-based clock check
        let data = decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(b"my-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();

        assert_eq!(data.claims.api_key, "my-id");
        assert_eq!(data.claims.timestamp, issued_at.timestamp_millis());
        assert_eq!(data.claims.exp - data.claims.timestamp, TOKEN_TTL_MS);
    }

    #[test]
    fn test_signed_token_rejects_wrong_secret() {
        let key = SigningKey::parse(ProviderId::Zhipu, "my-id.my-secret").unwrap();
        let token = key.sign().unwrap();

        let result = decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_missing_key() {
        let err = Credential::resolve(&zhipu(None)).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: ZHIPU_API_KEY is not configured");
    }

    #[test]
    fn test_bearer_authorization() {
        let provider = ProviderConfig::new(ProviderId::DeepSeek, Some("sk-abc".to_string()));
        let credential = Credential::resolve(&provider).unwrap();
        assert_eq!(credential.authorization().unwrap(), "Bearer sk-abc");
    }

    #[test]
    fn test_bearer_key_with_control_character_is_configuration_error() {
        let provider = ProviderConfig::new(ProviderId::DeepSeek, Some("sk-a\u{1}b".to_string()));
        let err = Credential::resolve(&provider).unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
    }

    #[test]
    fn test_authorization_header_is_sensitive() {
        let provider = ProviderConfig::new(ProviderId::DeepSeek, Some("sk-abc".to_string()));
        let credential = Credential::resolve(&provider).unwrap();
        assert!(credential.authorization().unwrap().is_sensitive());
    }

    #[test]
    fn test_signed_token_has_no_bearer_prefix() {
        let credential = Credential::resolve(&zhipu(Some("id.secret"))).unwrap();
        let value = credential.authorization().unwrap();
        let value = value.to_str().unwrap();
        assert!(!value.starts_with("Bearer"));
        assert_eq!(value.split('.').count(), 3);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let bearer = Credential::resolve(&ProviderConfig::new(
            ProviderId::DeepSeek,
            Some("sk-abc".to_string()),
        ))
        .unwrap();
        assert!(!format!("{:?}", bearer).contains("sk-abc"));

        let signed = Credential::resolve(&zhipu(Some("id.topsecret"))).unwrap();
        assert!(!format!("{:?}", signed).contains("topsecret"));
    }
}

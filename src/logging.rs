//! Logging setup
//!
//! JSON logs on stdout through `tracing-subscriber`. `RUST_LOG` takes
//! precedence over the configured log level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the log filter from `RUST_LOG`, falling back to `log_level`
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Install the global tracing subscriber
///
/// Returns an error if a global subscriber was already installed.
pub fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let console_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_filter(env_filter(log_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_from_level() {
        // RUST_LOG is normally unset under `cargo test`
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(env_filter("debug").to_string(), "debug");
        }
    }
}

//! Music Pal relay
//!
//! HTTP service that relays music-theory chat messages to an LLM provider.

use anyhow::Result;
use clap::Parser;
use music_pal_relay::{
    config::{Environment, ProviderId, Settings},
    logging::init_tracing,
    server::App,
};

/// Music Pal relay
///
/// Relays chat messages to DeepSeek or Zhipu GLM with a music-companion persona.
#[derive(Parser, Debug)]
#[command(name = "music-pal-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT env var)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides HOST env var)
    #[arg(long)]
    host: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Environment: dev, staging, prod (overrides ENVIRONMENT env var)
    #[arg(short, long)]
    env: Option<Environment>,

    /// Default completion provider (overrides LLM_PROVIDER env var)
    #[arg(long, value_enum)]
    provider: Option<ProviderId>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logging, so we can use log_level)
    let mut settings = Settings::load()?;

    // Override settings with CLI arguments
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(env) = args.env {
        settings.environment = env;
    }
    if let Some(provider) = args.provider {
        settings.default_provider = provider;
    }

    init_tracing(&settings.log_level)?;

    tracing::info!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        environment = %settings.environment,
        host = %settings.host,
        port = %settings.port,
        default_provider = %settings.default_provider,
        "Starting application"
    );

    // Checked after CLI overrides so `--provider` is taken into account
    if !settings.default_provider_has_credential() {
        tracing::warn!(
            provider = %settings.default_provider,
            env_var = settings.default_provider.api_key_env(),
            "Default provider has no API key configured; chat requests will fail"
        );
    }

    let app = App::new(settings)?;

    app.run_with_graceful_shutdown().await?;

    tracing::info!("Application shutdown complete");

    Ok(())
}

//! # hCaptcha Guard demo server
//!
//! Serves one hCaptcha protected endpoint so the middleware can be exercised
//! end to end.
//!
//! ## Architecture
//! ```text
//! Browser → HCaptchaLayer → POST /
//!                 ↓
//!          hcaptcha.com/siteverify
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod routes;

use crate::config::AppConfig;

/// hCaptcha Guard - verification middleware demo
#[derive(Parser, Debug)]
#[command(name = "hcaptcha-guard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/hcaptcha-guard.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// hCaptcha account secret (overrides config)
    #[arg(long, env = "HCAPTCHA_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Expected site key (overrides config)
    #[arg(long, env = "HCAPTCHA_SITE_KEY")]
    site_key: Option<String>,

    /// siteverify endpoint (overrides config)
    #[arg(long, env = "HCAPTCHA_VERIFY_URL")]
    verify_url: Option<String>,

    /// Forward the caller IP to siteverify
    #[arg(long, default_value = "false")]
    user_ip_validation: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting hCaptcha Guard v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config, &args)?;
    info!("Configuration loaded from {}", args.config);

    let hcaptcha = config.hcaptcha.build()?;
    info!(
        verify_url = hcaptcha.verify_url(),
        site_key = ?hcaptcha.site_key(),
        user_ip_validation = hcaptcha.user_ip_validation(),
        "hCaptcha middleware ready"
    );

    let app = routes::create_router(hcaptcha);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Listening on {}", config.listen_addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    // ConnectInfo feeds the peer address into remoteip
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
    .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()?;
    }

    Ok(())
}

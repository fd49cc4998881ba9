//! filevet-vd - File Validation Microservice
//!
//! Accepts base64-encoded file payloads over HTTP, classifies their
//! content type (magic-number signatures, then a CSV structure heuristic
//! for ambiguous text) and reports whether each payload is a valid CSV.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filevet_common::config;
use filevet_vd::AppState;

/// Command-line arguments for filevet-vd
#[derive(Parser, Debug)]
#[command(name = "filevet-vd")]
#[command(about = "File validation microservice for filevet")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "FILEVET_VD_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long, env = "FILEVET_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filevet_vd=debug,filevet_common=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config =
        config::load_service_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Starting filevet-vd (File Validation) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Max upload: {} bytes", config.max_upload_bytes);

    let ip: IpAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_address))?;
    let addr = SocketAddr::new(ip, config.port);
    let state = AppState::new(config);
    let app = filevet_vd::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

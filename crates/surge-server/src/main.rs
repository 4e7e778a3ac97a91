//! Surge server binary
//!
//! Loads configuration from the environment, spawns the store actor, runs
//! the idempotent stock initialization, and serves the sale API.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use surge_core::{SaleConfig, WallClockTime};
use surge_server::api;
use surge_server::sale::SaleService;
use surge_server::state::AppState;
use surge_store::ActorStore;
use tracing_subscriber::EnvFilter;

/// Surge server CLI
#[derive(Parser, Debug)]
#[command(name = "surge-server")]
#[command(about = "Flash-sale purchase service")]
#[command(version)]
struct Cli {
    /// HTTP bind address (overrides HOST/PORT from the environment)
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,tower_http=debug",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::info!("surge server v{}", env!("CARGO_PKG_VERSION"));

    // Configuration errors abort startup; nothing here is recoverable at
    // runtime.
    let config = SaleConfig::from_env().map_err(|e| anyhow::anyhow!("configuration: {}", e))?;
    tracing::info!(
        starts_at = %config.starts_at.to_rfc3339(),
        ends_at = %config.ends_at.to_rfc3339(),
        total_stock = config.total_stock,
        product = %config.product_name,
        "sale configured"
    );

    let addr: SocketAddr = cli
        .bind
        .clone()
        .unwrap_or_else(|| config.bind_address())
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address: {}", e))?;

    // The store actor owns both persisted keys; every mutation flows
    // through its mailbox.
    let store = Arc::new(ActorStore::spawn());
    let sale = SaleService::new(store, &config, Arc::new(WallClockTime::new()));

    sale.initialize()
        .await
        .map_err(|e| anyhow::anyhow!("stock initialization: {}", e))?;

    let state = AppState::with_cors_origin(sale, config.cors_origin.clone());
    let app = api::router(state);

    tracing::info!("starting HTTP server on {}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /health                      - Health check");
    tracing::info!("  GET  /api/sale/status             - Sale status");
    tracing::info!("  POST /api/sale/purchase           - Attempt a purchase");
    tracing::info!("  GET  /api/sale/purchase/:user_id  - Purchase status for a user");
    tracing::info!("  POST /api/sale/reset              - Reset the sale (test-facing)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

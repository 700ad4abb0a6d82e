//! Warp route discovery service

pub mod refresh;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use evm_chain_client::EvmChainClient;
use warp_api::{start_server, AppState};
use warp_core::AppConfig;
use warp_route::RouteIndex;

/// Discover warp routes and serve them over HTTP
#[derive(Debug, Parser)]
#[command(name = "warp-routes", version)]
#[command(about = "Discover cross-chain warp routes and serve them over HTTP", long_about = None)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(long, env = "WARP_ROUTES_CONFIG", default_value = "warp-routes.json")]
    pub config: PathBuf,

    /// API port (overrides `apiPort` from the configuration)
    #[arg(long)]
    pub port: Option<u16>,

    /// Run one discovery pass, print the result as JSON and exit
    #[arg(long)]
    pub once: bool,
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr; stdout carries only the `--once` JSON output.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("warp_route=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Run the service until interrupted, or a single pass with `--once`
pub async fn run(args: Args) -> anyhow::Result<()> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    tracing::info!(
        chains = config.chains.len(),
        tokens = config.tokens.len(),
        "Starting warp route discovery"
    );

    let client = EvmChainClient::from_config(&config).context("failed to create chain client")?;
    let index = Arc::new(RouteIndex::new(
        Arc::new(client),
        config.tokens.clone(),
        config.max_concurrent_tokens,
    ));

    if args.once {
        let snapshot = index.refresh().await.context("route discovery failed")?;
        println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
        return Ok(());
    }

    // Endpoints answer 503 until a pass succeeds
    if let Err(e) = index.refresh().await {
        tracing::error!(error = %e, "initial route discovery failed");
    }

    let refresher = refresh::spawn_refresh_loop(
        index.clone(),
        Duration::from_secs(config.refresh_interval_secs),
    );

    let port = args.port.unwrap_or(config.api_port);
    let state = AppState::new(config, index);
    let served = start_server(state, port, shutdown_signal()).await;

    refresher.abort();
    served.context("API server failed")?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

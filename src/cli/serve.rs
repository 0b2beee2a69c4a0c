//! Serve command - runs the HTTP API

use std::net::SocketAddr;

use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::{load_config, CommonArgs};
use crate::api::create_router_with_state;
use crate::config::AppConfig;
use crate::infrastructure::observability::init_metrics;

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Build from the export when no snapshot is stored
    #[arg(long)]
    pub build_on_start: bool,
}

/// Run the API server
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(&args.common)?;
    let metrics = init_metrics(config.metrics.enabled);

    let services = crate::build_services(&config)?;
    let build_if_missing = args.build_on_start || config.index.build_on_start;

    // A failed startup build leaves the server up but not ready
    match services.index.ensure_ready(build_if_missing).await {
        Ok(version) => info!(version = version, "Active index version"),
        Err(e) => warn!(error = %e, "Index not ready, POST /admin/index/rebuild to retry"),
    }

    let app = create_router_with_state(crate::create_app_state(&services, metrics));

    let addr = build_socket_addr(&config)?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

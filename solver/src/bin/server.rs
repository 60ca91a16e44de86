use std::sync::Arc;

use tracing::{info, warn};

use risk_odds::context::RiskContext;
use risk_odds::env_config;
use risk_odds::server::create_router;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_config::init_tracing();
    env_config::init_base_path()?;
    let port = env_config::server_port();
    let data_dir = env_config::data_dir();
    info!(data_dir = %data_dir.display(), "starting risk-odds API server");

    let ctx = RiskContext::new(Some(data_dir), env_config::grid_size());
    // Tables missing from the data dir are built in memory; run
    // risk-precompute to write them.
    ctx.warm_standard_tables()?;

    let app = create_router(Arc::new(ctx));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!(port, "server is running, press Ctrl+C to stop");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("stopping server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

use request_inspect::config::settings;
use request_inspect::handlers::{routes, AppState};
use request_inspect::services::metrics;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = settings::load()?;
    let level = settings.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    metrics::init_metrics();
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.app_port));
    info!(environment = %settings.environment, %addr, "starting request inspector");

    let state = AppState::from_settings(settings)?;
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        routes(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("request inspector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}

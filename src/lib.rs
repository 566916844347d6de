pub mod capture;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod result_view;
pub mod state;
pub mod submission;
pub mod web;
pub mod workflow;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use dashboard::{DashboardPoller, HttpAnalyticsSource};
use state::{AppError, AppState};

/// Start the operator surface and dashboard poller; run until Ctrl-C.
pub async fn run() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::ClientConfig::from_env();
    tracing::info!(
        cases_url = %config.cases_url,
        analytics_url = %config.analytics_url,
        surface = %config.surface,
        reset_policy = %config.reset_policy,
        "Configuration loaded"
    );

    let analytics = Arc::new(HttpAnalyticsSource::new(
        &config.analytics_url,
        config.poll_interval,
    )?);
    let poll_interval = config.poll_interval;
    let bind_addr = config.bind_addr;

    let state = Arc::new(AppState::from_config(config)?);
    let poller = DashboardPoller::start(analytics, state.dashboard.clone(), poll_interval);
    let server = web::start_web_server(state, bind_addr).await?;

    tracing::info!(url = %server.url(), "Open the capture form in a browser");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    tracing::info!("Shutting down");
    server.stop().await;
    poller.stop().await;
    Ok(())
}

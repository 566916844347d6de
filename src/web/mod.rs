//! Local operator surface: serves the capture form, result screen and
//! surveillance dashboard to a browser on the field device.
//!
//! Pattern: bind → spawn background task → return handle with shutdown channel.

pub mod error;
pub mod handlers;
pub mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::oneshot;

use crate::state::{AppError, AppState};
use crate::submission::DiagnosisService;

pub use error::WebError;

/// Photo plus cough clip plus multipart overhead.
const MAX_UPLOAD_BYTES: usize = 40 * 1024 * 1024;

/// Build the router. Separate from the server so tests can drive it directly.
pub fn build_router<S>(state: Arc<AppState<S>>) -> Router
where
    S: DiagnosisService + 'static,
{
    Router::new()
        .route("/", get(handlers::landing))
        .route(
            "/capture",
            get(handlers::capture_form::<S>).post(handlers::capture_submit::<S>),
        )
        .route("/reset", post(handlers::reset::<S>))
        .route("/dashboard", get(handlers::dashboard_page::<S>))
        .route("/api/dashboard", get(handlers::dashboard_json::<S>))
        .route("/api/case", get(handlers::case_status::<S>))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Handle to the running operator surface.
pub struct WebServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl WebServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Signal graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Web server shutdown signal sent");
        }
    }

    /// Shut down and wait for in-flight requests to drain.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Web server task ended abnormally");
            }
        }
    }
}

pub async fn start_web_server<S>(state: Arc<AppState<S>>, addr: SocketAddr) -> Result<WebServer, AppError>
where
    S: DiagnosisService + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;

    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Server(format!("Failed to get server address: {e}")))?;

    let app = build_router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Web server received shutdown signal");
        };

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Web server error: {e}");
        }

        tracing::info!("Web server stopped");
    });

    tracing::info!(%addr, "Web server started");

    Ok(WebServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

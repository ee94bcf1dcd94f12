//! Axum HTTP surface.
//!
//! ```text
//! GET  /                    → liveness { message, version, status }
//! POST /api/symptom-check   → SymptomResponse | { detail }
//! ```
//!
//! [`serve`] binds the listener and runs until the [`CancellationToken`] is
//! cancelled, then drains in-flight requests.

mod api;

use std::sync::Arc;

use axum::{Router, routing::{get, post}};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::checker::SymptomChecker;
use crate::error::AppError;

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<SymptomChecker>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/",                   get(api::root))
        .route("/api/symptom-check",  post(api::symptom_check))
        .with_state(state)
}

pub async fn serve(
    bind_addr: &str,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    let local = listener
        .local_addr()
        .map_or_else(|_| bind_addr.to_string(), |a| a.to_string());
    info!(bind = %local, "http server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}

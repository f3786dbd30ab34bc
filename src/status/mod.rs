//! Read-only status API.
//!
//! # Data Flow
//! ```text
//! Round scheduler → board.rs (arc-swap snapshot, once per round)
//! HTTP client → auth.rs (optional bearer key) → handlers.rs → board.rs
//! ```
//!
//! # Design Decisions
//! - The API never touches the registry, only published snapshots
//! - Values are at most one round old

pub mod auth;
pub mod board;
pub mod handlers;

use std::sync::Arc;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

pub use board::{StatusBoard, StatusSnapshot};

use self::auth::require_api_key;
use self::handlers::{get_host, get_hosts, get_status};

/// State injected into status handlers.
#[derive(Clone)]
pub struct StatusState {
    pub board: Arc<StatusBoard>,
    pub api_key: Option<Arc<str>>,
}

impl StatusState {
    pub fn new(board: Arc<StatusBoard>, api_key: Option<String>) -> Self {
        Self {
            board,
            api_key: api_key.map(Arc::from),
        }
    }
}

pub fn status_router(state: StatusState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/hosts", get(get_hosts))
        .route("/hosts/{address}", get(get_host))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the status API until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    state: StatusState,
    mut shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Status API listening");

    axum::serve(listener, status_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Status API stopped");
    Ok(())
}

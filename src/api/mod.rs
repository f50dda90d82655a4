//! REST API over a shared workspace.
//!
//! Endpoints:
//! - `POST /evaluate` evaluates a build selection
//! - `GET /designs`, `POST /designs`, `DELETE /designs/{id}` manage saved designs
//! - `PUT /constraints` replaces the active constraints
//! - `GET /project`, `POST /project` export and import MissionProject documents

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::workspace::Workspace;

pub use types::{DesignSummary, DesignsResponse, ErrorResponse, ImportResponse, SaveDesignRequest};

/// Workspace shared across request handlers.
///
/// Requests run on a thread pool, so every access to the design collection
/// goes through the mutex. Handlers never hold it across an await point.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// Builds the axum router with all API routes.
pub fn router(state: SharedWorkspace) -> Router {
    Router::new()
        .route("/evaluate", post(handlers::evaluate))
        .route("/designs", get(handlers::list_designs).post(handlers::save_design))
        .route("/designs/{id}", delete(handlers::delete_design))
        .route("/constraints", put(handlers::set_constraints))
        .route("/project", get(handlers::export_project).post(handlers::import_project))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: SharedWorkspace, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}

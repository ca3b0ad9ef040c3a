//! API Module
//!
//! HTTP layer for the dashboard: HTML pages for people, JSON for scripts.
//! Every handler reads through the shared `JobStore`; nothing here writes.

pub mod error;
pub mod health;
pub mod job;

use std::sync::Arc;

use axum::{Router, routing::get};
use rayjob_store::JobStore;
use tower_http::trace::TraceLayer;

/// Shared handler state
pub type AppState = Arc<dyn JobStore>;

/// Create the dashboard router with all endpoints
pub fn create_router(store: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Pages
        .route("/", get(job::active_page))
        .route("/completed", get(job::completed_page))
        .route("/jobs/{job_name}", get(job::detail_page))
        // JSON endpoints
        .route("/api/jobs/active", get(job::list_active_jobs))
        .route("/api/jobs/completed", get(job::list_completed_jobs))
        .route("/api/jobs/{job_name}", get(job::get_job))
        // Add state and middleware
        .with_state(store)
        .layer(TraceLayer::new_for_http())
}

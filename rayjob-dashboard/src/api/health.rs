//! Health Check API Handler

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::api::AppState;

/// GET /health
///
/// The process is healthy as long as it serves requests; an unreachable
/// store is reported in the body but does not fail the check.
pub async fn health_check(State(store): State<AppState>) -> impl IntoResponse {
    let store_status = match store.count().await {
        Ok(_) => "available",
        Err(e) => {
            tracing::debug!("Health check could not reach job store: {}", e);
            "unavailable"
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "store": store_status })),
    )
}

//! Job API Handlers
//!
//! Read-only views over the job store, as HTML pages and as JSON.

use axum::{
    Json,
    extract::{Path, State},
    response::Html,
};
use rayjob_core::domain::JobRecord;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult, PageResult};
use crate::render;

async fn find_job(store: &AppState, job_name: &str) -> ApiResult<JobRecord> {
    store
        .get_by_name(job_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Job '{}' not found", job_name)))
}

// =============================================================================
// Pages
// =============================================================================

/// GET /
/// Jobs that are still pending or running, newest start first
pub async fn active_page(State(store): State<AppState>) -> PageResult<Html<String>> {
    let jobs = store.active_jobs().await?;
    Ok(Html(render::active_page(&jobs)))
}

/// GET /completed
/// Finished jobs, most recently ended first
pub async fn completed_page(State(store): State<AppState>) -> PageResult<Html<String>> {
    let jobs = store.completed_jobs().await?;
    Ok(Html(render::completed_page(&jobs)))
}

/// GET /jobs/{job_name}
pub async fn detail_page(
    State(store): State<AppState>,
    Path(job_name): Path<String>,
) -> PageResult<Html<String>> {
    tracing::debug!("Rendering job: {}", job_name);

    let job = find_job(&store, &job_name).await?;
    Ok(Html(render::detail_page(&job)))
}

// =============================================================================
// JSON
// =============================================================================

/// GET /api/jobs/active
pub async fn list_active_jobs(State(store): State<AppState>) -> ApiResult<Json<Vec<JobRecord>>> {
    Ok(Json(store.active_jobs().await?))
}

/// GET /api/jobs/completed
pub async fn list_completed_jobs(
    State(store): State<AppState>,
) -> ApiResult<Json<Vec<JobRecord>>> {
    Ok(Json(store.completed_jobs().await?))
}

/// GET /api/jobs/{job_name}
pub async fn get_job(
    State(store): State<AppState>,
    Path(job_name): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    tracing::debug!("Getting job: {}", job_name);

    Ok(Json(find_job(&store, &job_name).await?))
}

//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use rayjob_store::StoreError;

use crate::render;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Unavailable(StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message shown to the client
    ///
    /// Store failures are logged in full but never echoed back.
    pub fn message(&self) -> String {
        match self {
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Unavailable(err) => {
                tracing::error!("Job store error: {}", err);
                "Job store is not available yet".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Unavailable(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Same errors rendered as an HTML page, for the browser-facing routes
#[derive(Debug)]
pub struct PageError(pub ApiError);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.message();

        (status, Html(render::error_page(status, &message))).into_response()
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        PageError(err)
    }
}

impl From<StoreError> for PageError {
    fn from(err: StoreError) -> Self {
        PageError(ApiError::Unavailable(err))
    }
}

pub type PageResult<T> = Result<T, PageError>;

//! RayJob HTTP Client
//!
//! A small, type-safe HTTP client for the two remote APIs the poller needs:
//! - the Kubernetes API server, for listing and deleting `RayJob` resources
//! - the Ray dashboard of each job's cluster, for fetching job logs
//!
//! # Example
//!
//! ```no_run
//! use rayjob_client::KubeRayClient;
//!
//! #[tokio::main]
//! async fn main() -> rayjob_client::Result<()> {
//!     let client = KubeRayClient::new("http://localhost:8888");
//!
//!     for job in client.list_ray_jobs("default").await? {
//!         println!("{:?} -> {}", job.name(), job.job_status());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod logs;
mod rayjobs;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for list and delete calls against the API server
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for log downloads, which can be large
pub const DEFAULT_LOG_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the KubeRay API server and Ray dashboards
///
/// Every request carries its own timeout so a slow endpoint fails the call
/// instead of stalling the caller.
#[derive(Debug, Clone)]
pub struct KubeRayClient {
    /// Base URL of the API server (e.g., "http://kuberay-apiserver:8888")
    base_url: String,
    /// HTTP client instance
    client: Client,
    request_timeout: Duration,
    log_timeout: Duration,
}

impl KubeRayClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API server
    ///
    /// # Example
    /// ```
    /// use rayjob_client::KubeRayClient;
    ///
    /// let client = KubeRayClient::new("http://localhost:8888");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_timeout: DEFAULT_LOG_TIMEOUT,
        }
    }

    /// Override the per-request timeouts
    ///
    /// # Arguments
    /// * `request_timeout` - Budget for list and delete calls
    /// * `log_timeout` - Budget for log downloads
    pub fn with_timeouts(mut self, request_timeout: Duration, log_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.log_timeout = log_timeout;
        self
    }

    /// Get the base URL of the API server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Reject non-success responses, carrying the body as the error message
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        Self::check_status(response).await?;
        Ok(())
    }
}

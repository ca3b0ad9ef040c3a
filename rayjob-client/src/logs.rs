//! Ray dashboard log endpoint

use crate::KubeRayClient;
use crate::error::{ClientError, Result};

/// Builds the log URL for a job served by the dashboard at `dashboard_url`
///
/// The operator reports the dashboard as `host:port`; a scheme is only added
/// when the address does not carry one.
pub(crate) fn job_logs_url(dashboard_url: &str, job_id: &str) -> String {
    let dashboard_url = dashboard_url.trim().trim_end_matches('/');
    let base = if dashboard_url.starts_with("http://") || dashboard_url.starts_with("https://") {
        dashboard_url.to_string()
    } else {
        format!("http://{}", dashboard_url)
    };

    format!("{}/api/jobs/{}/logs", base, job_id.trim())
}

impl KubeRayClient {
    /// Download the raw logs of a Ray job
    ///
    /// The body is returned untouched: it may be plain text or a JSON object
    /// wrapping the logs, and is not guaranteed to be valid UTF-8.
    ///
    /// # Arguments
    /// * `dashboard_url` - Address of the Ray dashboard (`dashboardURL` in the job status)
    /// * `job_id` - Ray submission id (`jobId` in the job status)
    pub async fn fetch_job_logs(&self, dashboard_url: &str, job_id: &str) -> Result<Vec<u8>> {
        if dashboard_url.trim().is_empty() || job_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "dashboard URL and job id are required to fetch logs".to_string(),
            ));
        }

        let url = job_logs_url(dashboard_url, job_id);
        let response = self
            .client
            .get(&url)
            .timeout(self.log_timeout)
            .send()
            .await?;

        let body = Self::check_status(response).await?.bytes().await?;
        Ok(body.to_vec())
    }
}

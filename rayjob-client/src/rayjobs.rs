//! RayJob resource endpoints of the Kubernetes API server

use crate::KubeRayClient;
use crate::error::{ClientError, Result};
use rayjob_core::dto::rayjob::{RayJob, RayJobList};

const RAYJOBS_API: &str = "apis/ray.io/v1";

impl KubeRayClient {
    fn rayjobs_url(&self, namespace: &str) -> Result<String> {
        if namespace.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "namespace cannot be empty".to_string(),
            ));
        }
        Ok(format!(
            "{}/{}/namespaces/{}/rayjobs",
            self.base_url, RAYJOBS_API, namespace
        ))
    }

    /// List all RayJobs in a namespace
    ///
    /// Items that cannot be decoded are logged and skipped; they never fail
    /// the whole list.
    ///
    /// # Arguments
    /// * `namespace` - The Kubernetes namespace to list
    pub async fn list_ray_jobs(&self, namespace: &str) -> Result<Vec<RayJob>> {
        let url = self.rayjobs_url(namespace)?;
        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let list: RayJobList = self.handle_response(response).await?;

        let jobs = list
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match RayJob::from_value(item) {
                Ok(job) => Some(job),
                Err(e) => {
                    tracing::warn!("Skipping malformed RayJob item #{}: {}", index, e);
                    None
                }
            })
            .collect();

        Ok(jobs)
    }

    /// Delete a RayJob resource
    ///
    /// # Arguments
    /// * `namespace` - The namespace holding the job
    /// * `job_name` - The resource name
    pub async fn delete_ray_job(&self, namespace: &str, job_name: &str) -> Result<()> {
        if job_name.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job name cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/{}", self.rayjobs_url(namespace)?, job_name);
        let response = self
            .client
            .delete(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}

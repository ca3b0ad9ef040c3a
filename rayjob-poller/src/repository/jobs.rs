//! Jobs repository
//!
//! Handles communication with the cluster for RayJob operations:
//! - Listing the RayJobs of the watched namespace
//! - Fetching the logs of a finished job from its Ray dashboard
//! - Deleting finished RayJob resources

use anyhow::{Context, Result};
use async_trait::async_trait;
use rayjob_client::KubeRayClient;
use rayjob_core::dto::rayjob::{RayJob, RayJobStatus};

/// Source of RayJob state for the reconciler
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Lists every RayJob currently present in the watched namespace
    async fn list_jobs(&self) -> Result<Vec<RayJob>>;

    /// Fetches the raw logs of a job
    ///
    /// # Arguments
    /// * `job_name` - Resource name, used for diagnostics
    /// * `status` - Status block carrying the dashboard address and Ray job id
    async fn fetch_logs(&self, job_name: &str, status: &RayJobStatus) -> Result<Vec<u8>>;

    /// Deletes a RayJob resource
    ///
    /// Deleting a job that no longer exists succeeds.
    async fn delete_job(&self, job_name: &str) -> Result<()>;
}

/// KubeRay API implementation of JobSource
pub struct KubeRayJobSource {
    client: KubeRayClient,
    namespace: String,
}

impl KubeRayJobSource {
    /// Creates a new KubeRay job source
    ///
    /// # Arguments
    /// * `client` - Client for the KubeRay API server
    /// * `namespace` - Namespace whose RayJobs are reconciled
    pub fn new(client: KubeRayClient, namespace: String) -> Self {
        Self { client, namespace }
    }
}

#[async_trait]
impl JobSource for KubeRayJobSource {
    async fn list_jobs(&self) -> Result<Vec<RayJob>> {
        self.client
            .list_ray_jobs(&self.namespace)
            .await
            .with_context(|| format!("Failed to list RayJobs in namespace {}", self.namespace))
    }

    async fn fetch_logs(&self, job_name: &str, status: &RayJobStatus) -> Result<Vec<u8>> {
        let (dashboard_url, job_id) = status
            .log_route()
            .with_context(|| format!("RayJob {} has no dashboard URL or job id", job_name))?;

        let body = self.client.fetch_job_logs(dashboard_url, job_id).await?;
        Ok(body)
    }

    async fn delete_job(&self, job_name: &str) -> Result<()> {
        match self.client.delete_ray_job(&self.namespace, job_name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::debug!("RayJob {} already deleted", job_name);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete RayJob {}", job_name)),
        }
    }
}

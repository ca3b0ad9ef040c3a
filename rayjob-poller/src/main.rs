//! RayJob Poller
//!
//! Mirrors the RayJobs of one Kubernetes namespace into the job store and
//! deletes finished jobs from the cluster once their logs are saved.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Repositories: HTTP communication with the KubeRay API and Ray dashboards
//! - Services: Reconciliation of cluster state into the store
//! - Scheduler: Fixed-interval polling with per-cycle failure isolation
//!
//! The store schema is created before the first cycle; failing to open the
//! store is the only error that stops the process.

mod config;
mod repository;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::{JobSource, KubeRayJobSource};
use crate::scheduler::JobPoller;
use crate::service::Reconciler;
use rayjob_client::KubeRayClient;
use rayjob_store::open_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rayjob_poller=info,rayjob_client=info,rayjob_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RayJob Poller");

    // Load configuration
    let config = Config::from_env().context("Invalid poller configuration")?;
    config.validate()?;
    info!(
        "Loaded configuration: namespace={}, api_server={}, store={}",
        config.namespace, config.api_server, config.store_path
    );

    // Open the store and make sure the schema exists before the first cycle
    let location = config.store_location()?;
    let store = open_store(&location)
        .await
        .with_context(|| format!("Failed to open job store at {}", location))?;
    store
        .ensure_schema()
        .await
        .context("Failed to initialize job store schema")?;

    info!("Job store initialized at {}", location);

    let client = KubeRayClient::new(config.api_server.clone())
        .with_timeouts(config.api_timeout, config.log_fetch_timeout);
    let source: Arc<dyn JobSource> =
        Arc::new(KubeRayJobSource::new(client, config.namespace.clone()));

    let reconciler = Arc::new(Reconciler::new(source, store));
    let poller = JobPoller::new(reconciler, config.poll_interval);

    info!(
        "Watching RayJobs in namespace '{}', polling every {:?}",
        config.namespace, config.poll_interval
    );

    tokio::select! {
        _ = poller.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received, stopping poller");
        }
    }

    Ok(())
}

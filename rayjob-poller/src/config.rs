//! Poller configuration
//!
//! Defines all configurable parameters for the poller: which namespace to
//! watch, where the KubeRay API lives, where records are stored and how often
//! to reconcile.

use rayjob_store::StoreLocation;
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_API_SERVER: &str =
    "http://kuberay-apiserver-service.default.svc.cluster.local:8888";
pub const DEFAULT_STORE_PATH: &str = "/app/database/ray_jobs.db";

/// Poller configuration
///
/// Built once at start-up and handed to the components that need it; nothing
/// below `main` reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Kubernetes namespace whose RayJobs are reconciled
    pub namespace: String,

    /// KubeRay API server base URL
    pub api_server: String,

    /// Job store location (`memory` or a SQLite file path)
    pub store_path: String,

    /// Delay between reconciliation cycles
    pub poll_interval: Duration,

    /// Timeout for list and delete calls
    pub api_timeout: Duration,

    /// Timeout for log downloads
    pub log_fetch_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(namespace: String, api_server: String) -> Self {
        Self {
            namespace,
            api_server,
            store_path: DEFAULT_STORE_PATH.to_string(),
            poll_interval: Duration::from_secs(60),
            api_timeout: Duration::from_secs(10),
            log_fetch_timeout: Duration::from_secs(15),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - POD_NAMESPACE (default: "default")
    /// - KUBERAY_API_SERVER (default: in-cluster KubeRay API service)
    /// - SQLITE_PATH (default: /app/database/ray_jobs.db, `memory` for a dry run)
    /// - POLL_INTERVAL (seconds, default: 60)
    /// - API_TIMEOUT (seconds, default: 10)
    /// - LOG_FETCH_TIMEOUT (seconds, default: 15)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let seconds = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds, got {:?}", key, raw)),
                None => Ok(default),
            }
        };

        Ok(Self {
            namespace: lookup("POD_NAMESPACE").unwrap_or(defaults.namespace),
            api_server: lookup("KUBERAY_API_SERVER").unwrap_or(defaults.api_server),
            store_path: lookup("SQLITE_PATH").unwrap_or(defaults.store_path),
            poll_interval: seconds("POLL_INTERVAL", defaults.poll_interval)?,
            api_timeout: seconds("API_TIMEOUT", defaults.api_timeout)?,
            log_fetch_timeout: seconds("LOG_FETCH_TIMEOUT", defaults.log_fetch_timeout)?,
        })
    }

    /// Parsed store location
    pub fn store_location(&self) -> anyhow::Result<StoreLocation> {
        Ok(StoreLocation::parse(&self.store_path)?)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.namespace.trim().is_empty() {
            anyhow::bail!("namespace cannot be empty");
        }

        if self.api_server.is_empty() {
            anyhow::bail!("api_server cannot be empty");
        }

        if !self.api_server.starts_with("http://") && !self.api_server.starts_with("https://") {
            anyhow::bail!("api_server must start with http:// or https://");
        }

        self.store_location()?;

        if self.poll_interval.as_secs() == 0 {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.api_timeout.is_zero() || self.log_fetch_timeout.is_zero() {
            anyhow::bail!("request timeouts must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE.to_string(), DEFAULT_API_SERVER.to_string())
    }
}

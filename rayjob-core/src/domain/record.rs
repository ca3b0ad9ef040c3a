//! Job record domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// Log text stored while a job has not reached a terminal state
pub const LOGS_PENDING: &str = "Logs are available after job completion.";

/// Log text stored when a terminal job carries no routing data for its logs
pub const LOGS_MISSING_ROUTING: &str = "Log data unavailable: Missing dashboard URL or Job ID.";

/// Persisted state of one RayJob, keyed by `job_name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_name: String,
    pub status: JobStatus,
    pub logs: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Record for a job that is still pending or running
    pub fn in_progress(
        job_name: impl Into<String>,
        status: JobStatus,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            status,
            logs: LOGS_PENDING.to_string(),
            start_time,
            end_time,
        }
    }

    /// Record for a job that reached a terminal state, with its final logs
    pub fn finished(
        job_name: impl Into<String>,
        status: JobStatus,
        logs: String,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            status,
            logs,
            start_time,
            end_time,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True while the stored logs are still the pending placeholder
    pub fn has_pending_logs(&self) -> bool {
        self.logs == LOGS_PENDING
    }
}

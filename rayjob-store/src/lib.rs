//! RayJob Store
//!
//! Durable table of job records keyed by job name. The poller is the only
//! writer; the dashboard and CLI read concurrently.
//!
//! Two backends implement [`JobStore`]:
//! - [`SqliteJobStore`]: SQLite in WAL mode, the deployment backend
//! - [`InMemoryJobStore`]: process-local map, for dry runs and tests
//!
//! The backend is picked once at start-up from a [`StoreLocation`].

pub mod db;
pub mod error;
mod memory;
mod sqlite;

pub use error::{Result, StoreError};
pub use memory::InMemoryJobStore;
pub use sqlite::SqliteJobStore;

use async_trait::async_trait;
use rayjob_core::domain::{JobRecord, JobStatus};
use std::path::PathBuf;
use std::sync::Arc;

/// Store capability shared by every backend
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates the job table and its indexes if they do not exist yet
    async fn ensure_schema(&self) -> Result<()>;

    /// Inserts or replaces the record with the same job name
    async fn upsert(&self, record: &JobRecord) -> Result<()>;

    /// Lists records whose status matches `filter`, newest first by `order`
    ///
    /// Records missing the ordering timestamp sort last; ties are broken by
    /// job name.
    async fn query_by_status(
        &self,
        filter: &StatusFilter,
        order: RecordOrder,
    ) -> Result<Vec<JobRecord>>;

    /// Looks up a single record
    async fn get_by_name(&self, job_name: &str) -> Result<Option<JobRecord>>;

    /// Number of stored records
    async fn count(&self) -> Result<u64>;

    /// Removes every record, returning how many were deleted
    async fn clear(&self) -> Result<u64>;

    /// Jobs that have not reached a terminal state, newest start first
    async fn active_jobs(&self) -> Result<Vec<JobRecord>> {
        self.query_by_status(&StatusFilter::active(), RecordOrder::StartTimeDesc)
            .await
    }

    /// Jobs in a terminal state, newest end first
    async fn completed_jobs(&self) -> Result<Vec<JobRecord>> {
        self.query_by_status(&StatusFilter::terminal(), RecordOrder::EndTimeDesc)
            .await
    }
}

/// Status predicate for range queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// Status is one of the listed values
    In(Vec<JobStatus>),
    /// Status is none of the listed values
    NotIn(Vec<JobStatus>),
}

impl StatusFilter {
    pub fn terminal() -> Self {
        Self::In(JobStatus::TERMINAL.to_vec())
    }

    pub fn active() -> Self {
        Self::NotIn(JobStatus::TERMINAL.to_vec())
    }

    pub fn statuses(&self) -> &[JobStatus] {
        match self {
            Self::In(statuses) | Self::NotIn(statuses) => statuses,
        }
    }

    pub fn includes(&self) -> bool {
        matches!(self, Self::In(_))
    }

    pub fn matches(&self, status: &JobStatus) -> bool {
        self.statuses().contains(status) == self.includes()
    }
}

/// Sort key for range queries, always descending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    StartTimeDesc,
    EndTimeDesc,
}

impl RecordOrder {
    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::StartTimeDesc => "start_time",
            Self::EndTimeDesc => "end_time",
        }
    }
}

/// Where the job store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Sqlite(PathBuf),
}

impl StoreLocation {
    /// Parses a location string: `memory` or a filesystem path
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(StoreError::InvalidLocation(
                "store location cannot be empty".to_string(),
            ));
        }

        if raw.eq_ignore_ascii_case("memory") || raw == ":memory:" {
            return Ok(Self::Memory);
        }

        let path = raw.strip_prefix("sqlite://").unwrap_or(raw);
        Ok(Self::Sqlite(PathBuf::from(path)))
    }
}

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Sqlite(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Opens the writable store backend for `location`
pub async fn open_store(location: &StoreLocation) -> Result<Arc<dyn JobStore>> {
    match location {
        StoreLocation::Memory => Ok(Arc::new(InMemoryJobStore::new())),
        StoreLocation::Sqlite(path) => Ok(Arc::new(SqliteJobStore::open(path).await?)),
    }
}

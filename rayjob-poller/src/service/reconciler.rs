//! Reconciler
//!
//! One reconciliation cycle lists the RayJobs of the namespace and mirrors
//! each of them into the job store. Jobs that reached a terminal state get
//! their logs collected and their cluster resource deleted, strictly after
//! the record has been committed.
//!
//! Only a failed list call aborts a cycle. Everything that goes wrong for a
//! single job is logged, counted in the [`CycleReport`] and contained to
//! that job.

use chrono::{DateTime, Utc};
use rayjob_client::ClientError;
use rayjob_core::domain::JobRecord;
use rayjob_core::domain::record::LOGS_MISSING_ROUTING;
use rayjob_core::dto::rayjob::{RayJob, RayJobStatus, parse_timestamp};
use rayjob_core::sanitize;
use rayjob_store::JobStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::repository::JobSource;

/// Counters describing what one cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Entries returned by the list call
    pub seen: usize,
    /// Entries in a terminal state
    pub terminal: usize,
    /// Entries still pending or running
    pub in_progress: usize,
    /// Entries dropped for lacking a name
    pub skipped: usize,
    /// Terminal entries whose logs could not be fetched
    pub log_failures: usize,
    /// Records the store refused
    pub store_failures: usize,
    /// Terminal resources that could not be deleted
    pub delete_failures: usize,
}

impl CycleReport {
    pub fn has_failures(&self) -> bool {
        self.log_failures + self.store_failures + self.delete_failures > 0
    }
}

/// Failure that aborts a whole cycle before anything is written
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Failed to list RayJobs: {0:#}")]
    ListFailed(anyhow::Error),
}

/// Mirrors RayJob state from a [`JobSource`] into a [`JobStore`]
pub struct Reconciler {
    source: Arc<dyn JobSource>,
    store: Arc<dyn JobStore>,
}

impl Reconciler {
    pub fn new(source: Arc<dyn JobSource>, store: Arc<dyn JobStore>) -> Self {
        Self { source, store }
    }

    /// Runs one reconciliation cycle
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        debug!("Starting reconciliation cycle");

        let jobs = self.source.list_jobs().await.map_err(|e| {
            error!("Error fetching RayJobs: {:#}", e);
            CycleError::ListFailed(e)
        })?;

        let mut report = CycleReport::default();

        if jobs.is_empty() {
            debug!("No RayJobs found in the cluster");
            return Ok(report);
        }

        for job in jobs {
            report.seen += 1;
            self.reconcile_job(job, &mut report).await;
        }

        Ok(report)
    }

    async fn reconcile_job(&self, job: RayJob, report: &mut CycleReport) {
        let Some(job_name) = job.name().map(str::to_string) else {
            warn!("Skipping RayJob without a name");
            report.skipped += 1;
            return;
        };

        let status = job.job_status();
        let start_time = timestamp(&job_name, "startTime", job.status.start_time.as_deref());
        let end_time = timestamp(&job_name, "endTime", job.status.end_time.as_deref());

        debug!("Processing job: {}, Status: {}", job_name, status);

        if !status.is_terminal() {
            report.in_progress += 1;
            let record = JobRecord::in_progress(job_name, status, start_time, end_time);
            if let Err(e) = self.store.upsert(&record).await {
                error!("Database error for job {}: {}", record.job_name, e);
                report.store_failures += 1;
            }
            return;
        }

        report.terminal += 1;
        info!(
            "Job {} is in terminal state {}, collecting logs and cleaning up",
            job_name, status
        );

        let logs = self.collect_logs(&job_name, &job.status, report).await;
        let record = JobRecord::finished(job_name, status, logs, start_time, end_time);

        // The remote job stays until its record is committed, so a failed
        // write is retried on the next cycle.
        if let Err(e) = self.store.upsert(&record).await {
            error!(
                "Database error for job {}, keeping RayJob for the next cycle: {}",
                record.job_name, e
            );
            report.store_failures += 1;
            return;
        }

        match self.source.delete_job(&record.job_name).await {
            Ok(()) => info!("Deleted job resource: {}", record.job_name),
            Err(e) => {
                warn!("Failed to delete job {}: {:#}", record.job_name, e);
                report.delete_failures += 1;
            }
        }
    }

    /// Fetches and sanitizes the logs of a terminal job
    ///
    /// Never fails: when logs cannot be obtained the returned text explains why.
    async fn collect_logs(
        &self,
        job_name: &str,
        status: &RayJobStatus,
        report: &mut CycleReport,
    ) -> String {
        if status.log_route().is_none() {
            warn!("Missing dashboardURL or jobId for {}, cannot fetch logs", job_name);
            report.log_failures += 1;
            return LOGS_MISSING_ROUTING.to_string();
        }

        match self.source.fetch_logs(job_name, status).await {
            Ok(raw) => sanitize::clean_bytes(&raw),
            Err(e) => {
                warn!("Failed to fetch logs for {}: {:#}", job_name, e);
                report.log_failures += 1;
                describe_log_failure(&e)
            }
        }
    }
}

/// Text stored in place of logs that could not be fetched
fn describe_log_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::ApiError { status, .. }) => {
            format!("Failed to fetch logs. Status: {}", status)
        }
        Some(ClientError::RequestFailed(e)) if e.is_timeout() => {
            "Failed to fetch logs: the request timed out.".to_string()
        }
        Some(ClientError::RequestFailed(e)) => {
            format!("Failed to fetch logs due to a network error: {}", e)
        }
        _ => format!("Failed to fetch logs: {:#}", err),
    }
}

fn timestamp(job_name: &str, field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        warn!("Ignoring unparsable {} {:?} for job {}", field, raw, job_name);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rayjob_core::domain::JobStatus;
    use rayjob_core::domain::record::LOGS_PENDING;
    use rayjob_core::dto::rayjob::ObjectMeta;
    use rayjob_store::{InMemoryJobStore, RecordOrder, SqliteJobStore, StatusFilter};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const START: &str = "2025-10-04T10:00:00Z";
    const END: &str = "2025-10-04T10:05:00Z";

    fn ray_job(name: &str, status: &str, end: Option<&str>) -> RayJob {
        RayJob {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
            },
            status: RayJobStatus {
                job_status: Some(status.to_string()),
                start_time: Some(START.to_string()),
                end_time: end.map(str::to_string),
                dashboard_url: Some(format!("{}-head-svc:8265", name)),
                job_id: Some(format!("{}-submission", name)),
            },
        }
    }

    fn start() -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 10, 4, 10, 0, 0).unwrap())
    }

    fn end() -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 10, 4, 10, 5, 0).unwrap())
    }

    /// In-memory cluster: deleted jobs disappear from later listings
    #[derive(Default)]
    struct FakeSource {
        jobs: Mutex<Vec<RayJob>>,
        list_fails: Mutex<bool>,
        logs: Mutex<HashMap<String, Result<Vec<u8>, u16>>>,
        delete_fails: Mutex<bool>,
        fetched: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_jobs(jobs: Vec<RayJob>) -> Arc<Self> {
            let source = Self::default();
            *source.jobs.lock().unwrap() = jobs;
            Arc::new(source)
        }

        fn set_jobs(&self, jobs: Vec<RayJob>) {
            *self.jobs.lock().unwrap() = jobs;
        }

        fn set_logs(&self, name: &str, body: impl AsRef<[u8]>) {
            self.logs
                .lock()
                .unwrap()
                .insert(name.to_string(), Ok(body.as_ref().to_vec()));
        }

        fn fail_logs(&self, name: &str, status: u16) {
            self.logs
                .lock()
                .unwrap()
                .insert(name.to_string(), Err(status));
        }

        fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobSource for FakeSource {
        async fn list_jobs(&self) -> anyhow::Result<Vec<RayJob>> {
            if *self.list_fails.lock().unwrap() {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.jobs.lock().unwrap().clone())
        }

        async fn fetch_logs(&self, job_name: &str, _status: &RayJobStatus) -> anyhow::Result<Vec<u8>> {
            self.fetched.lock().unwrap().push(job_name.to_string());
            match self.logs.lock().unwrap().get(job_name) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(ClientError::api_error(*status, "dashboard error").into()),
                None => Ok(Vec::new()),
            }
        }

        async fn delete_job(&self, job_name: &str) -> anyhow::Result<()> {
            if *self.delete_fails.lock().unwrap() {
                return Err(anyhow!("apiserver unavailable"));
            }
            self.deleted.lock().unwrap().push(job_name.to_string());
            self.jobs
                .lock()
                .unwrap()
                .retain(|job| job.name() != Some(job_name));
            Ok(())
        }
    }

    /// Store that refuses writes for one job name
    struct FlakyStore {
        inner: InMemoryJobStore,
        reject: String,
    }

    #[async_trait]
    impl JobStore for FlakyStore {
        async fn ensure_schema(&self) -> rayjob_store::Result<()> {
            self.inner.ensure_schema().await
        }

        async fn upsert(&self, record: &JobRecord) -> rayjob_store::Result<()> {
            if record.job_name == self.reject {
                return Err(rayjob_store::StoreError::InvalidLocation(
                    "database is read-only".to_string(),
                ));
            }
            self.inner.upsert(record).await
        }

        async fn query_by_status(
            &self,
            filter: &StatusFilter,
            order: RecordOrder,
        ) -> rayjob_store::Result<Vec<JobRecord>> {
            self.inner.query_by_status(filter, order).await
        }

        async fn get_by_name(&self, job_name: &str) -> rayjob_store::Result<Option<JobRecord>> {
            self.inner.get_by_name(job_name).await
        }

        async fn count(&self) -> rayjob_store::Result<u64> {
            self.inner.count().await
        }

        async fn clear(&self) -> rayjob_store::Result<u64> {
            self.inner.clear().await
        }
    }

    fn reconciler(source: &Arc<FakeSource>, store: &Arc<InMemoryJobStore>) -> Reconciler {
        Reconciler::new(source.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_terminal_job_is_recorded_then_deleted() {
        let source = FakeSource::with_jobs(vec![ray_job("alpha", "SUCCEEDED", Some(END))]);
        source.set_logs("alpha", b"\x1b[32mdone\x1b[0m");
        let store = Arc::new(InMemoryJobStore::new());

        let report = reconciler(&source, &store).run_cycle().await.unwrap();

        assert_eq!(report.terminal, 1);
        assert!(!report.has_failures());

        let record = store.get_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(record.status, JobStatus::Succeeded);
        assert_eq!(record.logs, "done");
        assert_eq!(record.start_time, start());
        assert_eq!(record.end_time, end());
        assert_eq!(source.deleted(), ["alpha"]);
    }

    #[tokio::test]
    async fn test_in_progress_job_gets_placeholder() {
        let source = FakeSource::with_jobs(vec![
            ray_job("pending", "PENDING", None),
            ray_job("running", "RUNNING", None),
            ray_job("seeded", "COMPLETED", Some(END)),
        ]);
        let store = Arc::new(InMemoryJobStore::new());

        let report = reconciler(&source, &store).run_cycle().await.unwrap();

        assert_eq!(report.in_progress, 3);
        for name in ["pending", "running", "seeded"] {
            let record = store.get_by_name(name).await.unwrap().unwrap();
            assert_eq!(record.logs, LOGS_PENDING);
        }
        let seeded = store.get_by_name("seeded").await.unwrap().unwrap();
        assert_eq!(seeded.end_time, end());
        assert!(source.deleted().is_empty());
        assert!(source.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_cycles_keep_one_record_per_job() {
        let source = FakeSource::with_jobs(vec![ray_job("alpha", "PENDING", None)]);
        let store = Arc::new(InMemoryJobStore::new());
        let reconciler = reconciler(&source, &store);

        reconciler.run_cycle().await.unwrap();
        source.set_jobs(vec![ray_job("alpha", "RUNNING", None)]);
        reconciler.run_cycle().await.unwrap();
        reconciler.run_cycle().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let record = store.get_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(record.status, JobStatus::Running);
    }

    #[tokio::test]
    async fn test_log_failure_is_isolated_to_its_job() {
        let source = FakeSource::with_jobs(vec![
            ray_job("a", "FAILED", Some(END)),
            ray_job("b", "SUCCEEDED", Some(END)),
        ]);
        source.fail_logs("a", 500);
        source.set_logs("b", br#"{"logs": "step 1\\nstep 2"}"#);
        let store = Arc::new(InMemoryJobStore::new());

        let report = reconciler(&source, &store).run_cycle().await.unwrap();

        assert_eq!(report.log_failures, 1);
        let a = store.get_by_name("a").await.unwrap().unwrap();
        assert_eq!(a.logs, "Failed to fetch logs. Status: 500");
        let b = store.get_by_name("b").await.unwrap().unwrap();
        assert_eq!(b.logs, "step 1\nstep 2");
        assert_eq!(source.deleted(), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_missing_routing_skips_log_fetch() {
        let mut job = ray_job("alpha", "STOPPED", Some(END));
        job.status.dashboard_url = None;
        let source = FakeSource::with_jobs(vec![job]);
        let store = Arc::new(InMemoryJobStore::new());

        reconciler(&source, &store).run_cycle().await.unwrap();

        let record = store.get_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(record.logs, LOGS_MISSING_ROUTING);
        assert!(source.fetched().is_empty());
        assert_eq!(source.deleted(), ["alpha"]);
    }

    #[tokio::test]
    async fn test_list_failure_leaves_store_untouched() {
        let source = FakeSource::with_jobs(vec![ray_job("alpha", "RUNNING", None)]);
        let store = Arc::new(InMemoryJobStore::new());
        let existing = JobRecord::in_progress("old", JobStatus::Pending, start(), None);
        store.upsert(&existing).await.unwrap();

        *source.list_fails.lock().unwrap() = true;
        let result = reconciler(&source, &store).run_cycle().await;

        assert!(matches!(result, Err(CycleError::ListFailed(_))));
        assert_eq!(store.snapshot().await, vec![existing]);
    }

    #[tokio::test]
    async fn test_empty_list_is_a_noop() {
        let source = FakeSource::with_jobs(vec![]);
        let store = Arc::new(InMemoryJobStore::new());

        let report = reconciler(&source, &store).run_cycle().await.unwrap();

        assert_eq!(report, CycleReport::default());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_nameless_entries_are_skipped() {
        let mut nameless = ray_job("", "SUCCEEDED", Some(END));
        nameless.metadata.name = None;
        let source = FakeSource::with_jobs(vec![nameless, ray_job("beta", "RUNNING", None)]);
        let store = Arc::new(InMemoryJobStore::new());

        let report = reconciler(&source, &store).run_cycle().await.unwrap();

        assert_eq!(report.seen, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(source.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_missing_status_defaults_to_unknown() {
        let mut job = ray_job("alpha", "RUNNING", None);
        job.status.job_status = None;
        job.status.start_time = Some("not-a-time".to_string());
        let source = FakeSource::with_jobs(vec![job]);
        let store = Arc::new(InMemoryJobStore::new());

        reconciler(&source, &store).run_cycle().await.unwrap();

        let record = store.get_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(record.status, JobStatus::Unknown);
        assert_eq!(record.start_time, None);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_committed_record() {
        let source = FakeSource::with_jobs(vec![ray_job("alpha", "FAILED", Some(END))]);
        source.set_logs("alpha", b"Traceback");
        *source.delete_fails.lock().unwrap() = true;
        let store = Arc::new(InMemoryJobStore::new());

        let report = reconciler(&source, &store).run_cycle().await.unwrap();

        assert_eq!(report.delete_failures, 1);
        let record = store.get_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(record.logs, "Traceback");
        assert!(source.deleted().is_empty());

        // The job is still listed, so the next cycle commits it again and deletes it
        *source.delete_fails.lock().unwrap() = false;
        let report = reconciler(&source, &store).run_cycle().await.unwrap();

        assert_eq!(report.terminal, 1);
        assert_eq!(report.delete_failures, 0);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get_by_name("alpha").await.unwrap().unwrap(), record);
        assert_eq!(source.deleted(), vec!["alpha".to_string()]);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_remote_job_and_continues() {
        let source = FakeSource::with_jobs(vec![
            ray_job("a", "SUCCEEDED", Some(END)),
            ray_job("b", "SUCCEEDED", Some(END)),
        ]);
        let store = Arc::new(FlakyStore {
            inner: InMemoryJobStore::new(),
            reject: "a".to_string(),
        });

        let reconciler = Reconciler::new(source.clone(), store.clone());
        let report = reconciler.run_cycle().await.unwrap();

        assert_eq!(report.store_failures, 1);
        assert!(store.get_by_name("a").await.unwrap().is_none());
        assert!(store.get_by_name("b").await.unwrap().is_some());
        assert_eq!(source.deleted(), ["b"]);
    }

    #[tokio::test]
    async fn test_alpha_lifecycle_against_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteJobStore::open(&dir.path().join("ray_jobs.db")).await.unwrap());
        store.ensure_schema().await.unwrap();

        let source = FakeSource::with_jobs(vec![ray_job("alpha", "RUNNING", None)]);
        let reconciler = Reconciler::new(source.clone(), store.clone());

        reconciler.run_cycle().await.unwrap();
        let record = store.get_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(
            record,
            JobRecord::in_progress("alpha", JobStatus::Running, start(), None)
        );

        source.set_jobs(vec![ray_job("alpha", "SUCCEEDED", Some(END))]);
        source.set_logs("alpha", b"done");
        reconciler.run_cycle().await.unwrap();

        let record = store.get_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(
            record,
            JobRecord::finished("alpha", JobStatus::Succeeded, "done".to_string(), start(), end())
        );
        assert_eq!(source.deleted(), ["alpha"]);

        // The resource is gone, so later cycles leave the record alone
        reconciler.run_cycle().await.unwrap();
        assert_eq!(source.deleted(), ["alpha"]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[test]
    fn test_describe_log_failure() {
        let err: anyhow::Error = ClientError::api_error(502, "bad gateway").into();
        assert_eq!(describe_log_failure(&err), "Failed to fetch logs. Status: 502");

        let err = anyhow!("dashboard unreachable");
        assert_eq!(
            describe_log_failure(&err),
            "Failed to fetch logs: dashboard unreachable"
        );
    }
}

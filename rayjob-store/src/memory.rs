//! In-memory job store
//!
//! Keeps records in a process-local map. Nothing survives a restart, so this
//! backend is only useful for dry runs of the poller and for tests.

use async_trait::async_trait;
use rayjob_core::domain::JobRecord;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::{JobStore, RecordOrder, StatusFilter};

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    records: RwLock<HashMap<String, JobRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, sorted by name
    pub async fn snapshot(&self) -> Vec<JobRecord> {
        let records = self.records.read().await;
        let mut all: Vec<JobRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.job_name.cmp(&b.job_name));
        all
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, record: &JobRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.job_name.clone(), record.clone());
        Ok(())
    }

    async fn query_by_status(
        &self,
        filter: &StatusFilter,
        order: RecordOrder,
    ) -> Result<Vec<JobRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<JobRecord> = records
            .values()
            .filter(|r| filter.matches(&r.status))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let key = |r: &JobRecord| match order {
                RecordOrder::StartTimeDesc => r.start_time,
                RecordOrder::EndTimeDesc => r.end_time,
            };
            Reverse(key(a))
                .cmp(&Reverse(key(b)))
                .then_with(|| a.job_name.cmp(&b.job_name))
        });

        Ok(matching)
    }

    async fn get_by_name(&self, job_name: &str) -> Result<Option<JobRecord>> {
        let records = self.records.read().await;
        Ok(records.get(job_name).cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rayjob_core::domain::JobStatus;

    #[tokio::test]
    async fn test_ordering_matches_sqlite_semantics() {
        let store = InMemoryJobStore::new();
        let at = |h| Some(Utc.with_ymd_and_hms(2025, 10, 4, h, 0, 0).unwrap());

        store
            .upsert(&JobRecord::in_progress("b", JobStatus::Running, at(1), None))
            .await
            .unwrap();
        store
            .upsert(&JobRecord::in_progress("a", JobStatus::Running, at(1), None))
            .await
            .unwrap();
        store
            .upsert(&JobRecord::in_progress("undated", JobStatus::Pending, None, None))
            .await
            .unwrap();
        store
            .upsert(&JobRecord::in_progress("newest", JobStatus::Pending, at(8), None))
            .await
            .unwrap();

        let names: Vec<String> = store
            .active_jobs()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.job_name)
            .collect();
        assert_eq!(names, ["newest", "a", "b", "undated"]);
    }

    #[tokio::test]
    async fn test_upsert_and_clear() {
        let store = InMemoryJobStore::new();
        let record = JobRecord::in_progress("alpha", JobStatus::Running, None, None);
        store.upsert(&record).await.unwrap();
        store.upsert(&record).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get_by_name("alpha").await.unwrap(), Some(record));
        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.snapshot().await.is_empty());
    }
}

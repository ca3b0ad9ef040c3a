//! SQLite job store
//!
//! Handles all database operations related to job records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rayjob_core::domain::{JobRecord, JobStatus};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::{JobStore, RecordOrder, StatusFilter, db};

const SELECT_COLUMNS: &str = "SELECT job_name, status, logs, start_time, end_time FROM ray_jobs";

/// Job store backed by a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Opens (and creates, if missing) the database at `path` for writing
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        tracing::info!("Opening job store at {}", path.display());
        let pool = db::create_pool(path).await?;
        Ok(Self { pool })
    }

    /// Opens the database at `path` for reading only
    ///
    /// Never fails up front; queries fail while the file does not exist.
    pub fn open_read_only(path: &Path) -> Self {
        Self {
            pool: db::create_read_only_pool(path),
        }
    }

    /// Wraps an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Drops and recreates the job table
    pub async fn reset(&self) -> Result<()> {
        db::drop_schema(&self.pool).await?;
        db::run_migrations(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn ensure_schema(&self) -> Result<()> {
        db::run_migrations(&self.pool).await?;
        Ok(())
    }

    async fn upsert(&self, record: &JobRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ray_jobs (job_name, status, logs, start_time, end_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(job_name) DO UPDATE SET
                status = excluded.status,
                logs = excluded.logs,
                start_time = excluded.start_time,
                end_time = excluded.end_time
            "#,
        )
        .bind(&record.job_name)
        .bind(record.status.as_str())
        .bind(&record.logs)
        .bind(record.start_time)
        .bind(record.end_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_by_status(
        &self,
        filter: &StatusFilter,
        order: RecordOrder,
    ) -> Result<Vec<JobRecord>> {
        let statuses = filter.statuses();
        if statuses.is_empty() && filter.includes() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);

        if !statuses.is_empty() {
            builder.push(if filter.includes() {
                " WHERE status IN ("
            } else {
                " WHERE status NOT IN ("
            });

            let mut separated = builder.separated(", ");
            for status in statuses {
                separated.push_bind(status.as_str().to_string());
            }
            separated.push_unseparated(")");
        }

        // SQLite sorts NULL lowest, so DESC leaves undated rows last
        builder
            .push(" ORDER BY ")
            .push(order.column())
            .push(" DESC, job_name ASC");

        let rows = builder
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_by_name(&self, job_name: &str) -> Result<Option<JobRecord>> {
        let row = sqlx::query_as::<_, JobRow>(&format!("{SELECT_COLUMNS} WHERE job_name = ?1"))
            .bind(job_name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ray_jobs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM ray_jobs")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    job_name: String,
    status: Option<String>,
    logs: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl From<JobRow> for JobRecord {
    fn from(row: JobRow) -> Self {
        JobRecord {
            job_name: row.job_name,
            status: JobStatus::from_source(row.status.as_deref()),
            logs: row.logs.unwrap_or_default(),
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

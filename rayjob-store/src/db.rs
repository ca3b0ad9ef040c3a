use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// Opens a writable pool, creating the database file if needed
///
/// The database is switched to WAL so readers never block on the poller.
pub async fn create_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// Opens a read-only pool without touching the file until first use
///
/// A missing database surfaces as an error on the first query, not here.
pub fn create_read_only_pool(path: &Path) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy_with(options)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ray_jobs (
            job_name TEXT PRIMARY KEY,
            status TEXT NOT NULL,
            logs TEXT NOT NULL,
            start_time TIMESTAMP,
            end_time TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Dashboard views filter by status and sort by either timestamp
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ray_jobs_status ON ray_jobs(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ray_jobs_start_time ON ray_jobs(start_time DESC)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ray_jobs_end_time ON ray_jobs(end_time DESC)")
        .execute(pool)
        .await?;

    tracing::debug!("Job store schema is up to date");
    Ok(())
}

pub async fn drop_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS ray_jobs")
        .execute(pool)
        .await?;

    tracing::info!("Dropped ray_jobs table");
    Ok(())
}

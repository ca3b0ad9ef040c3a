//! Database command handlers
//!
//! Creates, wipes and seeds the SQLite job store.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use colored::*;
use rayjob_core::domain::{JobRecord, JobStatus};
use rayjob_store::{JobStore, SqliteJobStore};

use crate::config::Config;

/// Database subcommands
#[derive(Subcommand)]
pub enum DbCommands {
    /// Create the database file and schema if they do not exist
    Init,
    /// Drop every stored job and recreate the schema
    Reset,
    /// Replace the store contents with sample jobs
    Seed,
}

/// Handle database commands
///
/// # Arguments
/// * `command` - The database command to execute
/// * `config` - The CLI configuration
pub async fn handle_db_command(command: DbCommands, config: &Config) -> Result<()> {
    let path = config.sqlite_path()?;
    let store = SqliteJobStore::open(&path)
        .await
        .with_context(|| format!("Failed to open job store at {}", path.display()))?;

    let result = match command {
        DbCommands::Init => init(&store).await,
        DbCommands::Reset => reset(&store).await,
        DbCommands::Seed => seed(&store, Utc::now()).await,
    };

    store.close().await;
    result?;

    println!("  Store: {}", path.display().to_string().cyan());
    Ok(())
}

async fn init(store: &SqliteJobStore) -> Result<()> {
    store
        .ensure_schema()
        .await
        .context("Failed to create job store schema")?;

    let count = store.count().await?;
    println!(
        "{}",
        format!("✓ Job store ready ({} job(s) stored)", count).green().bold()
    );
    Ok(())
}

async fn reset(store: &SqliteJobStore) -> Result<()> {
    store.reset().await.context("Failed to reset job store")?;

    println!("{}", "✓ Job store reset".green().bold());
    Ok(())
}

async fn seed(store: &SqliteJobStore, now: DateTime<Utc>) -> Result<()> {
    store.reset().await.context("Failed to reset job store")?;

    let records = sample_records(now);
    for record in &records {
        store
            .upsert(record)
            .await
            .with_context(|| format!("Failed to insert sample job {}", record.job_name))?;
        println!("  {} {}", "Inserted".green(), record.job_name);
    }

    println!(
        "{}",
        format!("✓ Seeded {} sample job(s)", records.len()).green().bold()
    );
    Ok(())
}

/// Sample jobs covering every dashboard view, timed relative to `now`
pub fn sample_records(now: DateTime<Utc>) -> Vec<JobRecord> {
    vec![
        JobRecord {
            job_name: "job_data_pipeline_alpha".to_string(),
            status: JobStatus::Running,
            logs: "INFO: Starting data ingestion...\nINFO: Processing batch 1/100...\nINFO: Current memory usage: 256MB"
                .to_string(),
            start_time: Some(now - Duration::minutes(10)),
            end_time: None,
        },
        JobRecord::in_progress(
            "job_model_training_beta",
            JobStatus::Pending,
            Some(now - Duration::minutes(2)),
            None,
        ),
        JobRecord::finished(
            "job_report_generation_20251004",
            JobStatus::Succeeded,
            "INFO: Starting report generation.\nINFO: Fetching sales data.\nINFO: Rendering PDF.\nSUCCESS: Report generated successfully at /reports/20251004.pdf"
                .to_string(),
            Some(now - Duration::hours(2)),
            Some(now - Duration::hours(1) - Duration::minutes(50)),
        ),
        JobRecord::finished(
            "job_db_cleanup_weekly",
            JobStatus::Failed,
            "INFO: Starting weekly cleanup job.\nERROR: Could not connect to primary database cluster.\nTRACEBACK: ...\nFATAL: Job failed after 3 retries."
                .to_string(),
            Some(now - Duration::days(1)),
            Some(now - Duration::days(1) + Duration::minutes(5)),
        ),
        JobRecord::finished(
            "job_user_sync_gamma",
            JobStatus::Succeeded,
            "INFO: Syncing user profiles from LDAP.\nINFO: 500 users processed.\nSUCCESS: Sync complete."
                .to_string(),
            Some(now - Duration::hours(5)),
            Some(now - Duration::hours(4) - Duration::minutes(45)),
        ),
    ]
}

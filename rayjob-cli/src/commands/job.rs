//! Job command handlers
//!
//! Read-only views of the stored jobs: the same lists the dashboard shows,
//! plus the full record of a single job.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use colored::*;
use rayjob_core::domain::{JobRecord, JobStatus};
use rayjob_store::{JobStore, SqliteJobStore};

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List active jobs (or finished ones with --completed)
    List {
        /// Show finished jobs instead of active ones
        #[arg(long)]
        completed: bool,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one job, including its logs
    Show {
        /// RayJob resource name
        name: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle job commands
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let path = config.sqlite_path()?;
    if !path.exists() {
        bail!(
            "No job store at {}; run `rayjob db init` or start the poller first",
            path.display()
        );
    }
    let store = SqliteJobStore::open_read_only(&path);

    let result = match command {
        JobCommands::List { completed, json } => list_jobs(&store, completed, json).await,
        JobCommands::Show { name, json } => show_job(&store, &name, json).await,
    };

    store.close().await;
    result
}

/// List active or completed jobs
async fn list_jobs(store: &dyn JobStore, completed: bool, json: bool) -> Result<()> {
    let (jobs, kind) = if completed {
        (store.completed_jobs().await, "completed")
    } else {
        (store.active_jobs().await, "active")
    };
    let jobs = jobs.with_context(|| format!("Failed to list {} jobs", kind))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("{}", format!("No {} jobs found.", kind).yellow());
    } else {
        println!("{}", format!("Found {} {} job(s):", jobs.len(), kind).bold());
        println!();
        for job in &jobs {
            print_job_summary(job);
        }
    }

    Ok(())
}

/// Get and display a single job
async fn show_job(store: &dyn JobStore, name: &str, json: bool) -> Result<()> {
    let job = store
        .get_by_name(name)
        .await
        .with_context(|| format!("Failed to read job {}", name))?
        .with_context(|| format!("Job '{}' not found", name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        print_job_details(&job);
    }

    Ok(())
}

/// Print a one-entry summary of a job
fn print_job_summary(job: &JobRecord) {
    println!("  {} {}", "▸".cyan(), job.job_name.bold());
    println!("    Status:   {}", colorize_status(&job.status));
    println!("    Started:  {}", format_time(job.start_time).dimmed());
    if let Some(ended) = job.end_time {
        println!("    Ended:    {}", format_time(Some(ended)).dimmed());
    }
    println!();
}

/// Print detailed job information
fn print_job_details(job: &JobRecord) {
    println!("{}", "Job Details:".bold());
    println!("  Name:        {}", job.job_name.cyan());
    println!("  Status:      {}", colorize_status(&job.status));
    println!("  Started:     {}", format_time(job.start_time));
    println!("  Ended:       {}", format_time(job.end_time));

    if let (Some(started), Some(ended)) = (job.start_time, job.end_time) {
        let seconds = ended.signed_duration_since(started).num_seconds();
        println!("  Duration:    {}s", seconds);
    }

    println!("\n{}", "Logs:".bold());
    println!("{}", "─".repeat(80).dimmed());
    if job.logs.is_empty() {
        println!("{}", "(empty)".dimmed());
    } else {
        println!("{}", job.logs);
    }
    println!("{}", "─".repeat(80).dimmed());
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Succeeded => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Stopped => status_str.dimmed(),
        JobStatus::Unknown | JobStatus::Other(_) => status_str.normal(),
    }
}

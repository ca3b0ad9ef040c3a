//! RayJob CLI
//!
//! Command-line interface for the job store shared by the poller and the
//! dashboard: schema maintenance, sample data and quick inspection.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "rayjob")]
#[command(about = "RayJob store maintenance CLI", long_about = None)]
struct Cli {
    /// Job store location (SQLite file path)
    #[arg(long, env = "SQLITE_PATH", default_value = "database/ray_jobs.db")]
    store: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        store_path: cli.store,
    };

    handle_command(cli.command, &config).await
}

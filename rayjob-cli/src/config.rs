//! Configuration module
//!
//! Handles CLI configuration: where the job store lives.

use anyhow::{Result, bail};
use rayjob_store::StoreLocation;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite job store
    pub store_path: String,
}

impl Config {
    /// Resolves the SQLite file behind `store_path`
    ///
    /// The in-memory backend lives only inside one process, so there is
    /// nothing for the CLI to inspect or maintain there.
    pub fn sqlite_path(&self) -> Result<PathBuf> {
        match StoreLocation::parse(&self.store_path)? {
            StoreLocation::Sqlite(path) => Ok(path),
            StoreLocation::Memory => bail!("the CLI needs a SQLite file, not an in-memory store"),
        }
    }
}

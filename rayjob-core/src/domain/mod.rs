//! Core domain types
//!
//! These types are written by the poller and read by the dashboard and CLI.

pub mod record;
pub mod status;

pub use record::JobRecord;
pub use status::JobStatus;

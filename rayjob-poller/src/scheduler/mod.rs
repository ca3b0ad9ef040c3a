//! Scheduler layer for the poller
//!
//! This layer drives reconciliation cycles at a fixed interval and keeps a
//! failing cycle from taking the process down.

pub mod poller;

pub use poller::JobPoller;

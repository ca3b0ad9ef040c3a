//! Service layer
//!
//! Services contain the business logic of the poller. They orchestrate
//! operations across the job source and the job store.

mod reconciler;

pub use reconciler::{CycleReport, Reconciler};

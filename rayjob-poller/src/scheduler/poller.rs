//! Job poller
//!
//! Runs a reconciliation cycle at a fixed interval, forever. Each cycle runs
//! in its own task so that even a panic inside the reconciler is reported as
//! a failed cycle instead of unwinding through the loop.

use std::any::Any;
use std::sync::Arc;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::service::{CycleReport, Reconciler};

/// Result of one supervised cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    Failed(String),
}

/// Job poller that repeatedly reconciles cluster state into the store
pub struct JobPoller {
    reconciler: Arc<Reconciler>,
    poll_interval: Duration,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(reconciler: Arc<Reconciler>, poll_interval: Duration) -> Self {
        Self {
            reconciler,
            poll_interval,
        }
    }

    /// Starts the polling loop
    ///
    /// Never returns; the first cycle runs immediately.
    pub async fn run(&self) {
        info!(
            "Starting job poller (interval: {:?})",
            self.poll_interval
        );

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    /// Performs a single supervised cycle
    pub async fn run_once(&self) -> CycleOutcome {
        debug!("Starting job processing cycle");

        let reconciler = Arc::clone(&self.reconciler);
        let handle = tokio::spawn(async move { reconciler.run_cycle().await });

        let outcome = match handle.await {
            Ok(Ok(report)) => CycleOutcome::Completed(report),
            Ok(Err(e)) => CycleOutcome::Failed(e.to_string()),
            Err(e) if e.is_panic() => CycleOutcome::Failed(format!(
                "cycle panicked: {}",
                panic_message(e.into_panic())
            )),
            Err(e) => CycleOutcome::Failed(format!("cycle task was cancelled: {}", e)),
        };

        match &outcome {
            CycleOutcome::Completed(report) if report.has_failures() => warn!(
                "Cycle finished with failures: {} job(s), {} log, {} store, {} delete failure(s)",
                report.seen, report.log_failures, report.store_failures, report.delete_failures
            ),
            CycleOutcome::Completed(report) if report.seen > 0 => info!(
                "Cycle finished: {} job(s), {} terminal, {} in progress, {} skipped",
                report.seen, report.terminal, report.in_progress, report.skipped
            ),
            CycleOutcome::Completed(_) => debug!("Cycle finished with no jobs"),
            CycleOutcome::Failed(reason) => error!("Error during poll cycle: {}", reason),
        }

        outcome
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

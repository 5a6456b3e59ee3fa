// Polling scheduler
// Runs every aggregator back-to-back, then sleeps the configured period.
// A failing or panicking aggregator is logged and the pass moves on.
//
// Numan Thabit 2025 Nov

use crate::aggregators::Aggregator;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Run one pass over `aggregators` in order.
pub async fn run_pass(aggregators: &[Box<dyn Aggregator>]) -> PassReport {
    let mut report = PassReport::default();
    for aggregator in aggregators {
        let outcome = AssertUnwindSafe(aggregator.run()).catch_unwind().await;
        match outcome {
            Ok(Ok(())) => report.succeeded += 1,
            Ok(Err(err)) => {
                report.failed += 1;
                error!(aggregator = aggregator.name(), error = ?err, "aggregator failed");
            }
            Err(panic) => {
                report.failed += 1;
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(aggregator = aggregator.name(), reason = %reason, "aggregator panicked");
            }
        }
    }
    report
}

pub struct Scheduler {
    aggregators: Vec<Box<dyn Aggregator>>,
    period: Duration,
}

impl Scheduler {
    pub fn new(aggregators: Vec<Box<dyn Aggregator>>, period: Duration) -> Self {
        Self {
            aggregators,
            period,
        }
    }

    /// Poll until `shutdown` resolves. A pass in flight is dropped as soon as
    /// the shutdown future completes.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut passes: u64 = 0;
        loop {
            tokio::select! {
                report = self.pass() => {
                    passes += 1;
                    debug!(
                        pass = passes,
                        succeeded = report.succeeded,
                        failed = report.failed,
                        "pass finished"
                    );
                }
                _ = &mut shutdown => break,
            }
        }
        info!(passes, "scheduler stopped");
    }

    async fn pass(&self) -> PassReport {
        let report = run_pass(&self.aggregators).await;
        tokio::time::sleep(self.period).await;
        report
    }
}

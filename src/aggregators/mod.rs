// Aggregators module
// Each aggregator polls one part of the on-call API and writes the metric
// families derived from it
//
// Numan Thabit 2025 Nov

pub mod health;
pub mod teams;
pub mod users;

pub use health::HealthAggregator;
pub use teams::TeamAggregator;
pub use users::UserAggregator;

use crate::errors::ExporterError;
use crate::metrics::ExporterMetrics;
use crate::transport::OncallClient;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type AggregatorFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExporterError>> + Send + 'a>>;

/// One polling step of a pass. An error leaves the series this aggregator
/// owns at their previous values.
pub trait Aggregator: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self) -> AggregatorFuture<'_>;
}

/// The aggregators of a pass, in the order they run.
pub fn default_aggregators(
    client: OncallClient,
    metrics: Arc<ExporterMetrics>,
) -> Vec<Box<dyn Aggregator>> {
    vec![
        Box::new(HealthAggregator::new(client.clone(), metrics.clone())),
        Box::new(UserAggregator::new(client.clone(), metrics.clone())),
        Box::new(TeamAggregator::new(client, metrics)),
    ]
}

// Health aggregator
// Probes the service root and publishes a binary reachability gauge
//
// Numan Thabit 2025 Nov

use super::{Aggregator, AggregatorFuture};
use crate::metrics::ExporterMetrics;
use crate::transport::oncall::ROOT_PATH;
use crate::transport::OncallClient;
use std::sync::Arc;

pub struct HealthAggregator {
    client: OncallClient,
    metrics: Arc<ExporterMetrics>,
}

impl HealthAggregator {
    pub fn new(client: OncallClient, metrics: Arc<ExporterMetrics>) -> Self {
        Self { client, metrics }
    }
}

impl Aggregator for HealthAggregator {
    fn name(&self) -> &'static str {
        "health"
    }

    fn run(&self) -> AggregatorFuture<'_> {
        Box::pin(async move {
            match self.client.fetch(ROOT_PATH).await {
                Ok(resp) => {
                    self.metrics.health_status.set(i64::from(resp.is_success()));
                    Ok(())
                }
                Err(err) => {
                    // unreachable counts as down
                    self.metrics.health_status.set(0);
                    Err(err)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::time::Duration;
    use url::Url;

    fn aggregator(base: &str) -> (HealthAggregator, Arc<ExporterMetrics>) {
        let metrics = Arc::new(ExporterMetrics::new().unwrap());
        let client = OncallClient::new(
            &Url::parse(base).unwrap(),
            Duration::from_secs(5),
            metrics.clone(),
        )
        .unwrap();
        (HealthAggregator::new(client, metrics.clone()), metrics)
    }

    #[tokio::test]
    async fn up_on_success() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/").with_status(200).create_async().await;

        let (agg, metrics) = aggregator(&server.url());
        agg.run().await.unwrap();
        assert_eq!(metrics.health_status.get(), 1);
    }

    #[tokio::test]
    async fn down_on_error_status() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/").with_status(500).create_async().await;

        let (agg, metrics) = aggregator(&server.url());
        metrics.health_status.set(1);
        agg.run().await.unwrap();
        assert_eq!(metrics.health_status.get(), 0);
        assert_eq!(metrics.api_requests_failed_total.get(), 1);
    }

    #[tokio::test]
    async fn down_when_unreachable() {
        let (agg, metrics) = aggregator("http://127.0.0.1:9");
        metrics.health_status.set(1);
        assert!(agg.run().await.is_err());
        assert_eq!(metrics.health_status.get(), 0);
    }
}

// Scrape endpoint
// Serves the exporter's registry in the Prometheus text format
//
// Numan Thabit 2025 Nov

use crate::metrics::ExporterMetrics;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Create the HTTP router with the scrape endpoints
pub fn create_metrics_router(metrics: Arc<ExporterMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

/// Health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn scrape(State(metrics): State<Arc<ExporterMetrics>>) -> Response {
    match metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

/// Bind the scrape listener and serve it on a background task.
pub async fn spawn(
    addr: SocketAddr,
    metrics: Arc<ExporterMetrics>,
) -> Result<tokio::task::JoinHandle<()>> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind metrics server on {addr}"))?;
    info!(address = %addr, "metrics server listening");

    let app = create_metrics_router(metrics);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "metrics server error");
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn serves_text_exposition() {
        let metrics = Arc::new(ExporterMetrics::new().unwrap());
        metrics.api_requests_total.inc();
        metrics.health_status.set(1);

        let resp = create_metrics_router(metrics)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            prometheus::TEXT_FORMAT
        );
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("oncall_api_requests_total 1"));
        assert!(text.contains("oncall_health_status 1"));
        assert!(text.contains("# HELP oncall_users_total"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let metrics = Arc::new(ExporterMetrics::new().unwrap());
        let resp = create_metrics_router(metrics)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn spawn_binds_ephemeral_port() {
        let metrics = Arc::new(ExporterMetrics::new().unwrap());
        let handle = spawn("127.0.0.1:0".parse().unwrap(), metrics).await.unwrap();
        handle.abort();
    }
}

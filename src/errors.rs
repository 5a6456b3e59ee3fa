// Error types and error handling module
// This file defines the error type shared by the API client, the aggregators
// and the metric registry of the exporter
//
// Numan Thabit 2025 Nov

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("transport error on {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {path}")]
    Status { path: String, status: StatusCode },
    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("metric registry error: {0}")]
    Registry(#[from] prometheus::Error),
}

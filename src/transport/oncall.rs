// On-call API transport layer
// This file implements the HTTP client used to poll the scheduling service,
// counting every attempt and every non-success response
//
// Numan Thabit 2025 Nov

use crate::errors::ExporterError;
use crate::metrics::ExporterMetrics;
use crate::model::{TeamSummary, User};
use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const ROOT_PATH: &str = "/";
pub const USERS_PATH: &str = "/api/v0/users";
pub const TEAMS_PATH: &str = "/api/v0/teams";

/// Characters that cannot appear verbatim inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub fn team_summary_path(team: &str) -> String {
    format!("/api/v0/teams/{}/summary", utf8_percent_encode(team, SEGMENT))
}

/// Status and raw body of one upstream call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub path: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body of a successful response.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ExporterError> {
        if !self.is_success() {
            return Err(ExporterError::Status {
                path: self.path.clone(),
                status: self.status,
            });
        }
        serde_json::from_slice(&self.body).map_err(|source| ExporterError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Clone)]
pub struct OncallClient {
    http: Client,
    base: String,
    metrics: Arc<ExporterMetrics>,
}

impl OncallClient {
    pub fn new(base: &Url, timeout: Duration, metrics: Arc<ExporterMetrics>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .context("build HTTP client for on-call API")?;

        Ok(Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
            metrics,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.base
    }

    /// Issue a single GET for `path`.
    ///
    /// Every call counts one attempt, whatever the outcome. A non-success
    /// status is counted as a failure and still handed back so the caller
    /// can decide what to skip. Only connection-level problems (refused,
    /// DNS, timeout) come back as errors.
    pub async fn fetch(&self, path: &str) -> Result<ApiResponse, ExporterError> {
        self.metrics.api_requests_total.inc();
        debug!(path = %path, "requesting");

        let transport = |source: reqwest::Error| ExporterError::Transport {
            path: path.to_string(),
            source,
        };
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            self.metrics.api_requests_failed_total.inc();
            warn!(path = %path, status = %status, "request to on-call API failed");
        }

        let body = resp.bytes().await.map_err(transport)?.to_vec();
        Ok(ApiResponse {
            path: path.to_string(),
            status,
            body,
        })
    }

    /// Fetch and decode `path`; `None` when the upstream answered with a
    /// non-success status.
    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ExporterError> {
        let resp = self.fetch(path).await?;
        if !resp.is_success() {
            return Ok(None);
        }
        resp.json().map(Some)
    }

    pub async fn users(&self) -> Result<Option<Vec<User>>, ExporterError> {
        self.fetch_json(USERS_PATH).await
    }

    pub async fn teams(&self) -> Result<Option<Vec<String>>, ExporterError> {
        self.fetch_json(TEAMS_PATH).await
    }

    pub async fn team_summary(&self, team: &str) -> Result<Option<TeamSummary>, ExporterError> {
        self.fetch_json(&team_summary_path(team)).await
    }
}

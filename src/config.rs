// Configuration management module
// This file handles loading and parsing of the exporter settings
// from environment variables
//
// Numan Thabit 2025 Nov

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the on-call API, e.g. http://oncall:8080
    pub oncall_exporter_api_url: Url,
    /// Address the scrape endpoint binds to
    pub http_server_ip: String,
    pub http_server_port: u16,
    /// Seconds to sleep between two polling passes
    pub oncall_exporter_update_period: u64,
    /// Per-request timeout in seconds
    pub oncall_exporter_api_timeout: u64,
    pub oncall_exporter_log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::build(config::Environment::default())
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_source(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(config::Environment::default().source(Some(vars)))
    }

    fn build(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .set_default("http_server_ip", "0.0.0.0")?
            .set_default("http_server_port", 8081)?
            .set_default("oncall_exporter_update_period", 10)?
            .set_default("oncall_exporter_api_timeout", 5)?
            .set_default("oncall_exporter_log_level", "info")?
            .add_source(env)
            .build()
            .context("read exporter environment")?;
        let cfg: Self = cfg
            .try_deserialize()
            .context("ONCALL_EXPORTER_API_URL must be set to a valid URL; numeric settings must be integers")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.oncall_exporter_update_period == 0 {
            bail!("ONCALL_EXPORTER_UPDATE_PERIOD must be greater than zero");
        }
        self.bind_addr()?;
        self.log_level()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .http_server_ip
            .parse()
            .with_context(|| format!("invalid HTTP_SERVER_IP: {}", self.http_server_ip))?;
        Ok(SocketAddr::new(ip, self.http_server_port))
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_secs(self.oncall_exporter_update_period)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.oncall_exporter_api_timeout)
    }

    /// Verbosity as a tracing level. Besides the tracing names this accepts
    /// the `warning`/`critical`/`fatal`/`notset` spellings older deployments use.
    pub fn log_level(&self) -> Result<LevelFilter> {
        let raw = self.oncall_exporter_log_level.trim().to_ascii_lowercase();
        let level = match raw.as_str() {
            "warning" => LevelFilter::WARN,
            "critical" | "fatal" => LevelFilter::ERROR,
            "notset" => LevelFilter::TRACE,
            other => other
                .parse()
                .with_context(|| format!("invalid ONCALL_EXPORTER_LOG_LEVEL: {other}"))?,
        };
        Ok(level)
    }
}

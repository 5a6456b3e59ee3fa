// Metrics and observability module
// This file declares every instrument the exporter publishes and owns the
// registry the scrape endpoint reads from
//
// Numan Thabit 2025 Nov

use crate::errors::ExporterError;
use prometheus::{Encoder, IntCounter, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

/// Label names shared by the per-team rotation gauges.
pub const ROTATION_LABELS: &[&str] = &["team_name", "rotation"];

/// Process-lifetime set of instruments. Built once at startup and shared
/// behind an `Arc` between the aggregators and the scrape server.
pub struct ExporterMetrics {
    registry: Registry,
    pub api_requests_total: IntCounter,
    pub api_requests_failed_total: IntCounter,
    pub health_status: IntGauge,
    pub users_total: IntGauge,
    pub users_without_contacts: IntGauge,
    pub users_without_phone: IntGauge,
    pub teams_total: IntGauge,
    pub teams_understaffed: IntGauge,
    pub teams_unreachable_by_phone: IntGauge,
    pub team_rotation_staff_count: IntGaugeVec,
    pub team_unreachable_by_phone_count: IntGaugeVec,
}

impl ExporterMetrics {
    /// Declare all instruments on a fresh registry.
    ///
    /// A fresh `Registry` carries no process or platform collectors, so only
    /// the exporter's own series are exposed.
    pub fn new() -> Result<Self, ExporterError> {
        let registry = Registry::new();

        let api_requests_total = counter(
            &registry,
            "oncall_api_requests_total",
            "Total count of requests to oncall API",
        )?;
        let api_requests_failed_total = counter(
            &registry,
            "oncall_api_requests_failed_total",
            "Total count of failed requests to oncall API",
        )?;
        let health_status = gauge(
            &registry,
            "oncall_health_status",
            "indicates if oncall is reachable at its mainpage",
        )?;
        let users_total = gauge(
            &registry,
            "oncall_users_total",
            "total number of users registered in the system",
        )?;
        let users_without_contacts = gauge(
            &registry,
            "oncall_users_without_contacts_gauge",
            "total number of users without contact data",
        )?;
        let users_without_phone = gauge(
            &registry,
            "oncall_users_without_phone",
            "Number of users without phone data (call or sms)",
        )?;
        let teams_total = gauge(
            &registry,
            "oncall_teams_total",
            "total number of active teams present in the system",
        )?;
        let teams_understaffed = gauge(
            &registry,
            "oncall_teams_understaffed",
            "total number of teams that do not have at least two members for current or next rotation",
        )?;
        let teams_unreachable_by_phone = gauge(
            &registry,
            "oncall_teams_total_unreachable_by_phone",
            "total number of teams that do not have phone contact data for current or next rotation",
        )?;
        let team_rotation_staff_count = gauge_vec(
            &registry,
            "oncall_team_rotation_staff_count",
            "number of members in given team on select rotation (if rotation does not exist returns 0)",
        )?;
        let team_unreachable_by_phone_count = gauge_vec(
            &registry,
            "oncall_team_unreachable_by_phone_count",
            "number of members in given team on select rotation that do not have phone contact data",
        )?;

        Ok(Self {
            registry,
            api_requests_total,
            api_requests_failed_total,
            health_status,
            users_total,
            users_without_contacts,
            users_without_phone,
            teams_total,
            teams_understaffed,
            teams_unreachable_by_phone,
            team_rotation_staff_count,
            team_unreachable_by_phone_count,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render the current values in the text exposition format.
    pub fn encode(&self) -> Result<String, ExporterError> {
        let families = self.registry.gather();
        let mut buf = Vec::with_capacity(4096);
        TextEncoder::new().encode(&families, &mut buf)?;
        // TextEncoder only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, ExporterError> {
    let c = IntCounter::new(name, help)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, ExporterError> {
    let g = IntGauge::new(name, help)?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

fn gauge_vec(registry: &Registry, name: &str, help: &str) -> Result<IntGaugeVec, ExporterError> {
    let g = IntGaugeVec::new(Opts::new(name, help), ROTATION_LABELS)?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

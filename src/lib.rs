// Library root module for oncall-exporter
// This file defines the public API and module structure of the exporter:
// polling the on-call API and publishing staffing metrics for scraping
//
// Numan Thabit 2025 Nov

pub mod aggregators;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod scheduler;
pub mod server;
pub mod transport;


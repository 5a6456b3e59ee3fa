// Transport layer
// HTTP access to the upstream on-call scheduling API
//
// Numan Thabit 2025 Nov

pub mod oncall;

pub use oncall::{ApiResponse, OncallClient};

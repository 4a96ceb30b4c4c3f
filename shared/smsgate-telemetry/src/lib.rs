//! smsgate telemetry
//!
//! Structured logging setup and in-process metric primitives.

mod config;
mod tracing_setup;
mod metrics;

pub use config::{filter_directive, TelemetryConfig, DEFAULT_LOG_LEVEL};
pub use tracing_setup::init_tracing;
pub use metrics::{Counter, Gauge, Histogram, HistogramSummary};

/// Initialize logging for a service. `log_level` is the filter used when
/// `RUST_LOG` is unset.
pub fn init(service_name: &str, log_level: &str) -> Result<(), TelemetryError> {
    init_tracing(service_name, &TelemetryConfig::new(log_level))
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}

//! Global subscriber installation

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global subscriber: env filter plus a JSON or plain fmt layer.
/// Fails if the directive does not parse or a subscriber is already set.
pub fn init_tracing(service_name: &str, config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = config.filter_directive(rust_log.as_deref());

    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| TelemetryError::TracingInit(format!("invalid filter '{}': {}", directive, e)))?;

    let json_layer = config.json_logs.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
    });
    let plain_layer = (!config.json_logs).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .try_init()
        .map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    tracing::info!(
        service = service_name,
        filter = %directive,
        from_rust_log = rust_log.is_some(),
        json_logs = config.json_logs,
        "Tracing initialized"
    );

    Ok(())
}

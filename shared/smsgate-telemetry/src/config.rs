//! Logging configuration

/// Filter used when neither `RUST_LOG` nor a configured level is usable
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Filter directive applied when `RUST_LOG` is unset
    pub log_level: String,
    pub json_logs: bool,
}

impl TelemetryConfig {
    /// `log_level` comes from the service configuration; only `JSON_LOGS`
    /// is read here.
    pub fn new(log_level: impl Into<String>) -> Self {
        Self {
            log_level: log_level.into(),
            json_logs: json_logs_enabled(std::env::var("JSON_LOGS").ok().as_deref()),
        }
    }

    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Directive to build the filter from, given the current `RUST_LOG`
    pub fn filter_directive(&self, rust_log: Option<&str>) -> String {
        filter_directive(rust_log, &self.log_level)
    }
}

/// `RUST_LOG` wins when set and non-blank, then the configured level,
/// then [`DEFAULT_LOG_LEVEL`].
pub fn filter_directive(rust_log: Option<&str>, configured: &str) -> String {
    [rust_log.unwrap_or_default(), configured]
        .into_iter()
        .map(str::trim)
        .find(|directive| !directive.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

/// JSON output unless explicitly disabled
fn json_logs_enabled(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "false" || v == "0" || v == "no" => false,
        _ => true,
    }
}

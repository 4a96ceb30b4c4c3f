//! Configuration for the gateway client, campaign dispatch and the service shell
//!
//! Values are built once at the process boundary (`from_env`) and then passed
//! by reference into every component. Nothing below the boundary reads the
//! environment.

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEND_ENDPOINT: &str = "/API/TaskHandle";
pub const DEFAULT_QUERY_ENDPOINT: &str = "/API/QueryInfo";
pub const DEFAULT_USER_ID: &str = "0";

/// Physical ports on the largest supported gateway model
pub const MAX_PORT_COUNT: u8 = 8;
pub const DEFAULT_PORT_COUNT: u8 = 4;
pub const DEFAULT_SMS_DELAY_MS: i64 = 6000;

/// Scheme used to reach the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl FromStr for Protocol {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(GatewayError::Config(format!(
                "Unsupported protocol: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject hosts that would let configuration redirect requests elsewhere.
///
/// The host must be non-empty and must not carry its own `scheme://` prefix.
pub fn validate_host(host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(GatewayError::Config("Host cannot be empty".to_string()));
    }
    if host.contains("://") {
        return Err(GatewayError::Config(
            "Invalid host: protocol not allowed in host configuration".to_string(),
        ));
    }
    Ok(())
}

fn normalize_endpoint(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Connection settings for one physical gateway
#[derive(Clone)]
pub struct GatewayConfig {
    host: String,
    port: Option<u16>,
    protocol: Protocol,
    username: String,
    password: String,
    send_endpoint: String,
    query_endpoint: String,
    user_id: String,
    port_dispatch: bool,
}

impl GatewayConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into();
        validate_host(&host)?;

        Ok(Self {
            host: host.trim().to_string(),
            port: None,
            protocol: Protocol::default(),
            username: username.into(),
            password: password.into(),
            send_endpoint: DEFAULT_SEND_ENDPOINT.to_string(),
            query_endpoint: DEFAULT_QUERY_ENDPOINT.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            port_dispatch: true,
        })
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_send_endpoint(mut self, path: &str) -> Self {
        self.send_endpoint = normalize_endpoint(path);
        self
    }

    pub fn with_query_endpoint(mut self, path: &str) -> Self {
        self.query_endpoint = normalize_endpoint(path);
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Older firmware has no per-port selection; disabling this sends `-1`
    /// (gateway picks the port) on every message.
    pub fn with_port_dispatch(mut self, enabled: bool) -> Self {
        self.port_dispatch = enabled;
        self
    }

    pub fn from_env() -> Result<Self> {
        let host = required_env("GATEWAY_HOST")?;
        let username = required_env("GATEWAY_USERNAME")?;
        let password = required_env("GATEWAY_PASSWORD")?;

        let mut config = Self::new(host, username, password)?;

        if let Ok(protocol) = env::var("GATEWAY_PROTOCOL") {
            config = config.with_protocol(protocol.parse()?);
        }
        if let Ok(port) = env::var("GATEWAY_PORT") {
            let port = port
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid GATEWAY_PORT: {}", e)))?;
            config = config.with_port(port);
        }
        if let Ok(path) = env::var("GATEWAY_SMS_ENDPOINT") {
            config = config.with_send_endpoint(&path);
        }
        if let Ok(path) = env::var("GATEWAY_QUERY_ENDPOINT") {
            config = config.with_query_endpoint(&path);
        }
        if let Ok(user_id) = env::var("GATEWAY_USER_ID") {
            config = config.with_user_id(user_id);
        }
        if let Ok(flag) = env::var("GATEWAY_PORT_DISPATCH") {
            config = config.with_port_dispatch(parse_flag(&flag, true));
        }

        Ok(config)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol.default_port())
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn send_endpoint(&self) -> &str {
        &self.send_endpoint
    }

    pub fn query_endpoint(&self) -> &str {
        &self.query_endpoint
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn port_dispatch(&self) -> bool {
        self.port_dispatch
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port())
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port())
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("send_endpoint", &self.send_endpoint)
            .field("query_endpoint", &self.query_endpoint)
            .field("user_id", &self.user_id)
            .field("port_dispatch", &self.port_dispatch)
            .finish()
    }
}

/// Throttling and port pool for bulk campaigns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    delay: Duration,
    port_count: u8,
}

impl DispatchSettings {
    /// A non-positive delay disables the pause between messages.
    pub fn new(delay_ms: i64, port_count: u8) -> Result<Self> {
        if port_count == 0 || port_count > MAX_PORT_COUNT {
            return Err(GatewayError::Validation(format!(
                "Port count must be between 1 and {}",
                MAX_PORT_COUNT
            )));
        }

        Ok(Self {
            delay: Duration::from_millis(delay_ms.max(0) as u64),
            port_count,
        })
    }

    pub fn from_env() -> Result<Self> {
        let delay_ms = match env::var("SMS_DELAY") {
            Ok(v) => v
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid SMS_DELAY: {}", e)))?,
            Err(_) => DEFAULT_SMS_DELAY_MS,
        };
        let port_count = match env::var("SMS_PORT_COUNT") {
            Ok(v) => v
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid SMS_PORT_COUNT: {}", e)))?,
            Err(_) => DEFAULT_PORT_COUNT,
        };

        Self::new(delay_ms, port_count).map_err(|e| GatewayError::Config(e.to_string()))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn port_count(&self) -> u8 {
        self.port_count
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_SMS_DELAY_MS as u64),
            port_count: DEFAULT_PORT_COUNT,
        }
    }
}

/// Settings for the service process itself
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub http_bind_address: String,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "sms-gateway".to_string()),
            http_bind_address: env::var("HTTP_BIND")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| GatewayError::Config(format!("{} is not set", key)))
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_host() {
        assert!(validate_host("10.0.0.5").is_ok());
        assert!(validate_host("gateway.local").is_ok());

        assert!(matches!(
            validate_host("http://10.0.0.5"),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            validate_host("file:///etc/passwd"),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(validate_host(""), Err(GatewayError::Config(_))));
        assert!(matches!(validate_host("   "), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_config_rejects_bad_host() {
        let err = GatewayConfig::new("https://evil.example", "admin", "admin").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_default_port_follows_protocol() {
        let config = GatewayConfig::new("10.0.0.5", "admin", "secret").unwrap();
        assert_eq!(config.port(), 80);
        assert_eq!(config.base_url(), "http://10.0.0.5:80");

        let config = config.with_protocol(Protocol::Https);
        assert_eq!(config.port(), 443);
        assert_eq!(config.base_url(), "https://10.0.0.5:443");

        let config = config.with_port(8443);
        assert_eq!(config.base_url(), "https://10.0.0.5:8443");
    }

    #[test]
    fn test_endpoints_are_normalized() {
        let config = GatewayConfig::new("10.0.0.5", "admin", "secret")
            .unwrap()
            .with_send_endpoint("api/send")
            .with_query_endpoint("/api/query");

        assert_eq!(config.send_endpoint(), "/api/send");
        assert_eq!(config.query_endpoint(), "/api/query");
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new("10.0.0.5", "admin", "secret").unwrap();
        assert_eq!(config.send_endpoint(), DEFAULT_SEND_ENDPOINT);
        assert_eq!(config.query_endpoint(), DEFAULT_QUERY_ENDPOINT);
        assert_eq!(config.user_id(), "0");
        assert!(config.port_dispatch());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = GatewayConfig::new("10.0.0.5", "admin", "hunter2").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!("HTTPS".parse::<Protocol>().unwrap(), Protocol::Https);
        assert_eq!(" http ".parse::<Protocol>().unwrap(), Protocol::Http);
        assert!("ftp".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_dispatch_settings_bounds() {
        assert!(DispatchSettings::new(100, 0).is_err());
        assert!(DispatchSettings::new(100, 9).is_err());

        let settings = DispatchSettings::new(250, 8).unwrap();
        assert_eq!(settings.port_count(), 8);
        assert_eq!(settings.delay(), Duration::from_millis(250));

        let settings = DispatchSettings::new(-5, 1).unwrap();
        assert_eq!(settings.delay(), Duration::ZERO);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE", false));
        assert!(!parse_flag("0", true));
        assert!(parse_flag("maybe", true));
    }
}

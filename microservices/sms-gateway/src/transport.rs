//! HTTP exchange with the gateway
//!
//! One call performs exactly one request. Failures come back as
//! `GatewayError` values; nothing here retries.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use smsgate_core::{GatewayConfig, GatewayError, Result};
use smsgate_proto::GatewayCommand;
use std::time::Duration;
use tracing::debug;

/// Budget for send and query commands
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for the liveness probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Successful exchange: HTTP status plus the decoded JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub status: u16,
    pub data: Value,
}

/// 200, or an auth challenge from a device that is present but rejecting us
pub fn is_reachable_status(status: u16) -> bool {
    matches!(status, 200 | 401 | 403)
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a command as JSON to `endpoint` (a path below the base URL)
    async fn send(
        &self,
        endpoint: &str,
        command: &GatewayCommand,
        timeout: Duration,
    ) -> Result<GatewayReply>;

    /// GET the root path and return whatever status the device answers with
    async fn probe(&self, timeout: Duration) -> Result<u16>;

    fn base_url(&self) -> &str;

    async fn check_reachable(&self) -> bool {
        match self.probe(PROBE_TIMEOUT).await {
            Ok(status) => is_reachable_status(status),
            Err(_) => false,
        }
    }
}

/// reqwest-backed transport using HTTP Basic authentication
pub struct HttpTransport {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            username: config.username().to_string(),
            password: config.password().to_string(),
        })
    }
}

fn map_request_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        command: &GatewayCommand,
        timeout: Duration,
    ) -> Result<GatewayReply> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(url = %url, event = command.event(), "Sending gateway command");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(command)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transport(format!(
                "Gateway returned HTTP {}",
                status.as_u16()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("Invalid JSON response: {}", e)))?;

        Ok(GatewayReply {
            status: status.as_u16(),
            data,
        })
    }

    async fn probe(&self, timeout: Duration) -> Result<u16> {
        let url = format!("{}/", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        Ok(response.status().as_u16())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn transport_for(server: &MockServer) -> HttpTransport {
        let config = GatewayConfig::new(server.host(), "admin", "secret")
            .unwrap()
            .with_port(server.port());
        HttpTransport::new(&config).unwrap()
    }

    fn send_command() -> GatewayCommand {
        GatewayCommand::SendSms {
            userid: "0".into(),
            num: "5493815682688".into(),
            port: "1".into(),
            encoding: "0".into(),
            smsinfo: "Hola".into(),
        }
    }

    #[test]
    fn test_reachable_statuses() {
        assert!(is_reachable_status(200));
        assert!(is_reachable_status(401));
        assert!(is_reachable_status(403));
        assert!(!is_reachable_status(404));
        assert!(!is_reachable_status(500));
    }

    #[tokio::test]
    async fn test_send_posts_json_with_basic_auth() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/API/TaskHandle")
                    .header("authorization", "Basic YWRtaW46c2VjcmV0")
                    .json_body(json!({
                        "event": "txsms",
                        "userid": "0",
                        "num": "5493815682688",
                        "port": "1",
                        "encoding": "0",
                        "smsinfo": "Hola"
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"result": "ok", "content": "taskid:42"}));
            })
            .await;

        let transport = transport_for(&server);
        let reply = transport
            .send("/API/TaskHandle", &send_command(), COMMAND_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.data["content"], "taskid:42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_non_json_body_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/API/TaskHandle");
                then.status(200).body("<html>login</html>");
            })
            .await;

        let transport = transport_for(&server);
        let err = transport
            .send("/API/TaskHandle", &send_command(), COMMAND_TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_send_http_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/API/TaskHandle");
                then.status(500);
            })
            .await;

        let transport = transport_for(&server);
        let err = transport
            .send("/API/TaskHandle", &send_command(), COMMAND_TIMEOUT)
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::Transport("Gateway returned HTTP 500".into()));
    }

    #[tokio::test]
    async fn test_send_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/API/TaskHandle");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({"result": "ok"}));
            })
            .await;

        let transport = transport_for(&server);
        let err = transport
            .send("/API/TaskHandle", &send_command(), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_reachability_accepts_auth_challenge() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(401);
            })
            .await;

        let transport = transport_for(&server);
        assert!(transport.check_reachable().await);
    }

    #[tokio::test]
    async fn test_reachability_rejects_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(404);
            })
            .await;

        let transport = transport_for(&server);
        assert!(!transport.check_reachable().await);
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        // Nothing listens on port 9 locally
        let config = GatewayConfig::new("127.0.0.1", "admin", "secret")
            .unwrap()
            .with_port(9);
        let transport = HttpTransport::new(&config).unwrap();

        assert!(!transport.check_reachable().await);
    }
}

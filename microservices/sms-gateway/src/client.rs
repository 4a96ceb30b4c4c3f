//! Gateway client: one method per gateway operation
//!
//! Wires the codec and decoders to a [`Transport`]. Single sends never
//! return an error; the outcome is carried in the [`SendResult`]. Queries
//! return `Err` only when the exchange itself fails, and decode fail-soft.

use serde::Serialize;
use smsgate_core::{
    ConnectState, DeliveryStatus, GatewayConfig, PortState, ReceivedMessage, Recipient, Result,
    SendResult,
};
use smsgate_proto::{GatewayCommand, GatewayEnvelope, ALL_PORTS, AUTO_PORT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codec::ProtocolCodec;
use crate::inbox::{InboxContent, ReceivedMessageParser};
use crate::port_status::PortStatusDecoder;
use crate::time_window::TimeWindow;
use crate::transport::{is_reachable_status, HttpTransport, Transport, COMMAND_TIMEOUT, PROBE_TIMEOUT};

/// Status checks get a shorter budget than sends
const STATUS_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusReport {
    pub task_id: String,
    pub status: DeliveryStatus,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortReport {
    pub port_states: Vec<PortState>,
    pub connect_states: Vec<ConnectState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub reachable: bool,
    pub status_code: Option<u16>,
    pub url: String,
    pub error: Option<String>,
}

pub struct GatewayClient {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    codec: ProtocolCodec,
    inbox: ReceivedMessageParser,
    ports: PortStatusDecoder,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            codec: ProtocolCodec::new(),
            inbox: ReceivedMessageParser::new(),
            ports: PortStatusDecoder::new(),
        }
    }

    /// Client over HTTP, built from an already validated config
    pub fn connect(config: GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send one message on `port` (`"-1"` lets the gateway choose)
    pub async fn send_to(&self, recipient: &Recipient, port: &str) -> SendResult {
        let command = self.codec.encode_send(
            &recipient.phone,
            &recipient.message,
            port,
            self.config.user_id(),
        );

        match self
            .transport
            .send(self.config.send_endpoint(), &command, COMMAND_TIMEOUT)
            .await
        {
            Ok(reply) => {
                let ack = self.codec.decode_send_response(&reply.data);
                if ack.success {
                    debug!(
                        phone = %recipient.phone,
                        port = %port,
                        task_id = ?ack.task_id,
                        "SMS accepted by gateway"
                    );
                    SendResult::accepted(recipient, ack.task_id, reply.data)
                } else {
                    let envelope = GatewayEnvelope::from_value(&reply.data);
                    let reason = envelope
                        .content_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| "gateway did not accept the command".to_string());
                    warn!(phone = %recipient.phone, port = %port, reason = %reason, "SMS rejected by gateway");
                    SendResult::rejected(recipient, reply.data, reason)
                }
            }
            Err(e) => {
                warn!(phone = %recipient.phone, port = %port, error = %e, "Error sending SMS");
                SendResult::failed(recipient, e.to_string())
            }
        }
    }

    /// Single send outside a campaign; `None` lets the gateway choose the port
    pub async fn send_sms(&self, phone: &str, message: &str, port: Option<u8>) -> SendResult {
        let port = port
            .map(|p| p.to_string())
            .unwrap_or_else(|| AUTO_PORT.to_string());
        self.send_to(&Recipient::new(phone, message), &port).await
    }

    async fn query(&self, command: &GatewayCommand, timeout: Duration) -> Result<GatewayEnvelope> {
        let reply = self
            .transport
            .send(self.config.query_endpoint(), command, timeout)
            .await?;
        Ok(GatewayEnvelope::from_value(&reply.data))
    }

    pub async fn query_task_status(&self, task_id: &str) -> Result<TaskStatusReport> {
        let command = self.codec.encode_query_task(task_id);
        let envelope = self.query(&command, COMMAND_TIMEOUT).await?;

        let content = envelope.content_str().map(str::to_string);
        let status = match (&content, envelope.is_ok()) {
            (Some(content), true) => self.codec.decode_task_status(content),
            _ => DeliveryStatus::Unknown,
        };

        debug!(task_id = %task_id, status = ?status, "Task status queried");

        Ok(TaskStatusReport {
            task_id: task_id.to_string(),
            status,
            content,
        })
    }

    /// Inbox messages in `window`. `ports` defaults to every port.
    pub async fn query_received(
        &self,
        window: &TimeWindow,
        ports: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<ReceivedMessage>> {
        let command = self.codec.encode_query_received(
            &window.begintime,
            &window.endtime,
            ports.unwrap_or(ALL_PORTS),
            phone,
        );
        let envelope = self.query(&command, COMMAND_TIMEOUT).await?;

        if !envelope.is_ok() {
            warn!(result = ?envelope.result, "Inbox query not accepted by gateway");
            return Ok(Vec::new());
        }

        let messages = self.inbox.parse(&InboxContent::from_envelope(&envelope));
        info!(count = messages.len(), "Inbox queried");
        Ok(messages)
    }

    /// Outbox query; content is returned undecoded
    pub async fn query_sent(&self, window: &TimeWindow, ports: Option<&str>) -> Result<GatewayEnvelope> {
        let command = self.codec.encode_query_sent(
            &window.begintime,
            &window.endtime,
            ports.unwrap_or(ALL_PORTS),
        );
        self.query(&command, COMMAND_TIMEOUT).await
    }

    pub async fn port_info(&self) -> Result<GatewayEnvelope> {
        self.query(&self.codec.encode_port_info(), STATUS_QUERY_TIMEOUT)
            .await
    }

    pub async fn port_connection_state(&self) -> Result<GatewayEnvelope> {
        self.query(&self.codec.encode_port_connect_state(), STATUS_QUERY_TIMEOUT)
            .await
    }

    pub async fn wireless_info(&self, info_type: &str, port: Option<&str>) -> Result<GatewayEnvelope> {
        self.query(
            &self.codec.encode_wireless_info(info_type, port),
            STATUS_QUERY_TIMEOUT,
        )
        .await
    }

    /// Decoded line and registration state of every port
    pub async fn port_report(&self) -> Result<PortReport> {
        let info = self.port_info().await?;
        let connect = self.port_connection_state().await?;

        Ok(PortReport {
            port_states: info
                .content_str()
                .map(|c| self.ports.port_states(c))
                .unwrap_or_default(),
            connect_states: connect
                .content_str()
                .map(|c| self.ports.connect_states(c))
                .unwrap_or_default(),
        })
    }

    /// Probe the device root; 200/401/403 count as reachable
    pub async fn check_status(&self) -> GatewayStatus {
        let url = format!("{}/", self.transport.base_url());

        match self.transport.probe(PROBE_TIMEOUT).await {
            Ok(code) => GatewayStatus {
                reachable: is_reachable_status(code),
                status_code: Some(code),
                url,
                error: None,
            },
            Err(e) => GatewayStatus {
                reachable: false,
                status_code: None,
                url,
                error: Some(e.to_string()),
            },
        }
    }

    pub async fn check_reachable(&self) -> bool {
        self.transport.check_reachable().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::GatewayReply;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use smsgate_core::GatewayError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded(Mutex<Vec<(String, Value)>>);

    struct ScriptedTransport {
        reply: Result<Value>,
        probe: Result<u16>,
        calls: Recorded,
    }

    impl ScriptedTransport {
        fn replying(reply: Value) -> Self {
            Self {
                reply: Ok(reply),
                probe: Ok(200),
                calls: Recorded::default(),
            }
        }

        fn failing(err: GatewayError) -> Self {
            Self {
                reply: Err(err.clone()),
                probe: Err(err),
                calls: Recorded::default(),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            endpoint: &str,
            command: &GatewayCommand,
            _timeout: Duration,
        ) -> Result<GatewayReply> {
            self.calls
                .0
                .lock()
                .unwrap()
                .push((endpoint.to_string(), serde_json::to_value(command).unwrap()));
            self.reply.clone().map(|data| GatewayReply { status: 200, data })
        }

        async fn probe(&self, _timeout: Duration) -> Result<u16> {
            self.probe.clone()
        }

        fn base_url(&self) -> &str {
            "http://10.0.0.5:80"
        }
    }

    fn client_with(transport: ScriptedTransport) -> (GatewayClient, Arc<ScriptedTransport>) {
        let config = GatewayConfig::new("10.0.0.5", "admin", "secret")
            .unwrap()
            .with_user_id("7");
        let transport = Arc::new(transport);
        (GatewayClient::new(config, transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_send_sms_accepted() {
        let (client, transport) =
            client_with(ScriptedTransport::replying(json!({"result": "ok", "content": "taskid:42"})));

        let result = client.send_sms("5493815682688", "Hola", Some(2)).await;

        assert!(result.success);
        assert_eq!(result.task_id.as_deref(), Some("42"));
        assert!(result.error.is_none());

        let calls = transport.calls.0.lock().unwrap();
        assert_eq!(calls[0].0, "/API/TaskHandle");
        assert_eq!(calls[0].1["port"], "2");
        assert_eq!(calls[0].1["userid"], "7");
        assert_eq!(calls[0].1["encoding"], "0");
    }

    #[tokio::test]
    async fn test_send_sms_auto_port() {
        let (client, transport) =
            client_with(ScriptedTransport::replying(json!({"result": "ok", "content": "taskid:1"})));

        client.send_sms("123", "x", None).await;

        assert_eq!(transport.calls.0.lock().unwrap()[0].1["port"], "-1");
    }

    #[tokio::test]
    async fn test_send_sms_rejected_keeps_reason() {
        let (client, _) =
            client_with(ScriptedTransport::replying(json!({"result": "error", "content": "bad creds"})));

        let result = client.send_sms("123", "x", Some(1)).await;

        assert!(!result.success);
        assert_eq!(result.task_id, None);
        assert_eq!(result.error.as_deref(), Some("bad creds"));
        assert!(result.raw_response.is_some());
    }

    #[tokio::test]
    async fn test_send_sms_transport_failure() {
        let (client, _) = client_with(ScriptedTransport::failing(GatewayError::Transport(
            "connection refused".into(),
        )));

        let result = client.send_sms("123", "x", Some(1)).await;

        assert!(!result.success);
        assert!(result.raw_response.is_none());
        assert_eq!(result.error.as_deref(), Some("Transport error: connection refused"));
    }

    #[tokio::test]
    async fn test_query_task_status() {
        let (client, transport) = client_with(ScriptedTransport::replying(
            json!({"result": "ok", "content": "taskid:42:2;1:5493815682688:0"}),
        ));

        let report = client.query_task_status("42").await.unwrap();

        assert_eq!(report.status, DeliveryStatus::Delivered);
        let calls = transport.calls.0.lock().unwrap();
        assert_eq!(calls[0].0, "/API/QueryInfo");
        assert_eq!(calls[0].1, json!({"event": "querytxsms", "taskid": "42"}));
    }

    #[tokio::test]
    async fn test_query_task_status_error_envelope() {
        let (client, _) =
            client_with(ScriptedTransport::replying(json!({"result": "error", "content": "taskid:42:2"})));

        let report = client.query_task_status("42").await.unwrap();
        assert_eq!(report.status, DeliveryStatus::Unknown);
    }

    #[tokio::test]
    async fn test_query_received_defaults_ports() {
        let (client, transport) = client_with(ScriptedTransport::replying(json!({
            "result": "ok",
            "content": "total:1;20251219203330:2(-1)(-1):5493815682688:Hola|E"
        })));
        let window = TimeWindow::new("20251219000000", "20251219235959").unwrap();

        let messages = client.query_received(&window, None, None).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "Hola");
        assert_eq!(transport.calls.0.lock().unwrap()[0].1["port"], ALL_PORTS);
    }

    #[tokio::test]
    async fn test_query_received_error_envelope_is_empty() {
        let (client, _) =
            client_with(ScriptedTransport::replying(json!({"result": "error", "content": "denied"})));
        let window = TimeWindow::new("20251219000000", "20251219235959").unwrap();

        let messages = client.query_received(&window, Some("1"), None).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_query_received_transport_error() {
        let (client, _) =
            client_with(ScriptedTransport::failing(GatewayError::Timeout("30s".into())));
        let window = TimeWindow::new("20251219000000", "20251219235959").unwrap();

        let err = client.query_received(&window, None, None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_check_status() {
        let (client, _) = client_with(ScriptedTransport::replying(json!({})));
        let status = client.check_status().await;

        assert!(status.reachable);
        assert_eq!(status.status_code, Some(200));
        assert_eq!(status.url, "http://10.0.0.5:80/");

        let (client, _) =
            client_with(ScriptedTransport::failing(GatewayError::Transport("refused".into())));
        let status = client.check_status().await;

        assert!(!status.reachable);
        assert!(status.error.is_some());
        assert!(!client.check_reachable().await);
    }
}

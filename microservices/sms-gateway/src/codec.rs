//! Command encoding and response decoding for the gateway protocol
//!
//! Decoders never fail: a missing pattern is a normal outcome and maps to
//! `None` / `DeliveryStatus::Unknown`.

use regex::Regex;
use serde_json::Value;
use smsgate_core::DeliveryStatus;
use smsgate_proto::{GatewayCommand, GatewayEnvelope};

/// 7-bit ASCII
pub const ENCODING_ASCII: &str = "0";
/// UCS-2
pub const ENCODING_UCS2: &str = "8";

/// Gateway character-set flag for a message body
pub fn detect_encoding(message: &str) -> &'static str {
    if message.is_ascii() {
        ENCODING_ASCII
    } else {
        ENCODING_UCS2
    }
}

/// Decoded answer to a `txsms` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAck {
    pub success: bool,
    pub task_id: Option<String>,
}

pub struct ProtocolCodec {
    task_id_pattern: Regex,
    task_status_pattern: Regex,
}

impl ProtocolCodec {
    pub fn new() -> Self {
        Self {
            task_id_pattern: Regex::new(r"taskid:(\d+)").expect("valid task id pattern"),
            task_status_pattern: Regex::new(r"taskid:(\d+):(\d+)")
                .expect("valid task status pattern"),
        }
    }

    pub fn encode_send(
        &self,
        phone: &str,
        message: &str,
        port: &str,
        user_id: &str,
    ) -> GatewayCommand {
        GatewayCommand::SendSms {
            userid: user_id.to_string(),
            num: phone.to_string(),
            port: port.to_string(),
            encoding: detect_encoding(message).to_string(),
            smsinfo: message.to_string(),
        }
    }

    pub fn decode_send_response(&self, raw: &Value) -> SendAck {
        let envelope = GatewayEnvelope::from_value(raw);
        if !envelope.is_ok() {
            return SendAck {
                success: false,
                task_id: None,
            };
        }

        let task_id = envelope
            .content_str()
            .and_then(|content| self.task_id_pattern.captures(content))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        SendAck {
            success: true,
            task_id,
        }
    }

    pub fn encode_query_task(&self, task_id: &str) -> GatewayCommand {
        GatewayCommand::QueryTask {
            taskid: task_id.to_string(),
        }
    }

    /// Read `taskid:<id>:<code>` out of a `querytxsms` content string
    pub fn decode_task_status(&self, content: &str) -> DeliveryStatus {
        self.task_status_pattern
            .captures(content)
            .and_then(|caps| caps.get(2))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(DeliveryStatus::from_code)
            .unwrap_or(DeliveryStatus::Unknown)
    }

    pub fn encode_query_received(
        &self,
        begin: &str,
        end: &str,
        ports: &str,
        phone: Option<&str>,
    ) -> GatewayCommand {
        GatewayCommand::QueryReceived {
            begintime: begin.to_string(),
            endtime: end.to_string(),
            port: ports.to_string(),
            phonenum: phone
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        }
    }

    pub fn encode_query_sent(&self, begin: &str, end: &str, ports: &str) -> GatewayCommand {
        GatewayCommand::QuerySent {
            begintime: begin.to_string(),
            endtime: end.to_string(),
            port: ports.to_string(),
        }
    }

    pub fn encode_port_info(&self) -> GatewayCommand {
        GatewayCommand::PortInfo {}
    }

    pub fn encode_port_connect_state(&self) -> GatewayCommand {
        GatewayCommand::PortConnectState {}
    }

    pub fn encode_wireless_info(&self, info_type: &str, port: Option<&str>) -> GatewayCommand {
        GatewayCommand::WirelessInfo {
            info_type: info_type.to_string(),
            port: port.map(str::to_string),
        }
    }
}

impl Default for ProtocolCodec {
    fn default() -> Self {
        Self::new()
    }
}

//! Core domain types shared by the gateway client and the service

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for one bulk-dispatch run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

impl CampaignId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One destination of a campaign, already normalized upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub phone: String,
    pub message: String,
}

impl Recipient {
    pub fn new(phone: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            message: message.into(),
        }
    }
}

/// Outcome of sending to a single recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendResult {
    pub phone: String,
    pub message: String,
    pub success: bool,
    pub task_id: Option<String>,
    pub raw_response: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl SendResult {
    /// Gateway accepted the command (`result == "ok"`).
    pub fn accepted(
        recipient: &Recipient,
        task_id: Option<String>,
        raw_response: serde_json::Value,
    ) -> Self {
        Self {
            phone: recipient.phone.clone(),
            message: recipient.message.clone(),
            success: true,
            task_id,
            raw_response: Some(raw_response),
            error: None,
        }
    }

    /// Gateway answered but did not accept the command.
    pub fn rejected(
        recipient: &Recipient,
        raw_response: serde_json::Value,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            phone: recipient.phone.clone(),
            message: recipient.message.clone(),
            success: false,
            task_id: None,
            raw_response: Some(raw_response),
            error: Some(reason.into()),
        }
    }

    /// The exchange itself failed; no gateway answer to keep.
    pub fn failed(recipient: &Recipient, error: impl Into<String>) -> Self {
        Self {
            phone: recipient.phone.clone(),
            message: recipient.message.clone(),
            success: false,
            task_id: None,
            raw_response: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregated view of a finished campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign_id: CampaignId,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<SendResult>,
}

impl CampaignReport {
    pub fn new(campaign_id: CampaignId, results: Vec<SendResult>) -> Self {
        let sent = results.iter().filter(|r| r.success).count();
        Self {
            campaign_id,
            total: results.len(),
            sent,
            failed: results.len() - sent,
            results,
        }
    }
}

/// Message read back from the gateway inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub phone: String,
    pub message: String,
    /// `YYYYMMDDHHMMSS`, as reported by the gateway
    pub time: String,
    pub port: String,
}

/// Delivery state reported by a task status query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Accepted,
    InProgress,
    Delivered,
    Failed,
    Unknown,
}

impl DeliveryStatus {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Accepted,
            1 => Self::InProgress,
            2 => Self::Delivered,
            3 => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Accepted => Some(0),
            Self::InProgress => Some(1),
            Self::Delivered => Some(2),
            Self::Failed => Some(3),
            Self::Unknown => None,
        }
    }
}

/// Lifecycle of one outbound message.
///
/// `Delivered`, `Failed` and `SendFailed` are terminal. Moving past `Sent`
/// only happens through an explicit status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutboundState {
    Queued,
    Sent { task_id: String },
    InProgress { task_id: String },
    Delivered { task_id: String },
    Failed { task_id: String },
    SendFailed { reason: String },
}

impl OutboundState {
    pub fn from_result(result: &SendResult) -> Self {
        match (&result.task_id, result.success) {
            (Some(task_id), true) => Self::Sent {
                task_id: task_id.clone(),
            },
            _ => Self::SendFailed {
                reason: result
                    .error
                    .clone()
                    .unwrap_or_else(|| "no task id assigned".to_string()),
            },
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::Sent { task_id }
            | Self::InProgress { task_id }
            | Self::Delivered { task_id }
            | Self::Failed { task_id } => Some(task_id),
            Self::Queued | Self::SendFailed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered { .. } | Self::Failed { .. } | Self::SendFailed { .. }
        )
    }

    /// Advance with a status read from the gateway. `Accepted` and `Unknown`
    /// carry no new information.
    pub fn apply(self, status: DeliveryStatus) -> Self {
        let task_id = match &self {
            Self::Sent { task_id } | Self::InProgress { task_id } => task_id.clone(),
            _ => return self,
        };

        match status {
            DeliveryStatus::InProgress => Self::InProgress { task_id },
            DeliveryStatus::Delivered => Self::Delivered { task_id },
            DeliveryStatus::Failed => Self::Failed { task_id },
            DeliveryStatus::Accepted | DeliveryStatus::Unknown => self,
        }
    }
}

/// Line state of a gateway port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Idle,
    OffHook,
    Ringing,
    Talking,
    Dialing,
    Pending,
    Ringback,
    Interior,
    Unavailable,
    Other(u32),
}

impl PortState {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Idle,
            1 => Self::OffHook,
            2 => Self::Ringing,
            3 => Self::Talking,
            4..=6 => Self::Dialing,
            7 => Self::Pending,
            9 => Self::Ringback,
            10 => Self::Interior,
            11 => Self::Unavailable,
            other => Self::Other(other),
        }
    }
}

/// Network registration state of a gateway port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectState {
    Unconnected,
    Connected,
    Connecting,
    Rejected,
    Unknown,
    Roaming,
    Other(u32),
}

impl ConnectState {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Unconnected,
            1 => Self::Connected,
            2 => Self::Connecting,
            3 => Self::Rejected,
            4 => Self::Unknown,
            5 => Self::Roaming,
            other => Self::Other(other),
        }
    }
}

//! Commands accepted by the gateway's `TaskHandle` / `QueryInfo` endpoints
//!
//! Every command is a flat JSON object discriminated by its `event` field.
//! Numeric values (ports, encodings, task ids) travel as strings.

use serde::{Deserialize, Serialize};

/// Port value that lets the gateway choose a port itself
pub const AUTO_PORT: &str = "-1";

/// Port list used when an inbox query names no ports
pub const ALL_PORTS: &str = "1,2,3,4,5,6,7,8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum GatewayCommand {
    /// Submit one SMS
    #[serde(rename = "txsms")]
    SendSms {
        userid: String,
        num: String,
        port: String,
        encoding: String,
        smsinfo: String,
    },

    /// Delivery status of a previously accepted send
    #[serde(rename = "querytxsms")]
    QueryTask { taskid: String },

    /// Inbox between two `YYYYMMDDHHMMSS` timestamps
    #[serde(rename = "queryrxsms")]
    QueryReceived {
        begintime: String,
        endtime: String,
        port: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        phonenum: Option<String>,
    },

    /// Outbox between two `YYYYMMDDHHMMSS` timestamps
    #[serde(rename = "querysxsms")]
    QuerySent {
        begintime: String,
        endtime: String,
        port: String,
    },

    #[serde(rename = "getportinfo")]
    PortInfo {},

    #[serde(rename = "getportconnectstate")]
    PortConnectState {},

    #[serde(rename = "getwirelessinfo")]
    WirelessInfo {
        #[serde(rename = "type")]
        info_type: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        port: Option<String>,
    },
}

impl GatewayCommand {
    /// Wire name of the command
    pub fn event(&self) -> &'static str {
        match self {
            Self::SendSms { .. } => "txsms",
            Self::QueryTask { .. } => "querytxsms",
            Self::QueryReceived { .. } => "queryrxsms",
            Self::QuerySent { .. } => "querysxsms",
            Self::PortInfo {} => "getportinfo",
            Self::PortConnectState {} => "getportconnectstate",
            Self::WirelessInfo { .. } => "getwirelessinfo",
        }
    }
}

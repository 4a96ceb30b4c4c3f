//! Gateway response envelope: `{ "result": "ok" | "error", "content": ... }`

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESULT_OK: &str = "ok";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GatewayEnvelope {
    #[serde(default)]
    pub result: Option<String>,
    /// Usually a delimited string; some firmware returns an array of records.
    #[serde(default)]
    pub content: Value,
}

impl GatewayEnvelope {
    /// Read an envelope out of any JSON value. Missing or mistyped fields
    /// become `None` / `Null` instead of an error.
    pub fn from_value(raw: &Value) -> Self {
        Self {
            result: raw
                .get("result")
                .and_then(Value::as_str)
                .map(str::to_string),
            content: raw.get("content").cloned().unwrap_or(Value::Null),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.as_deref() == Some(RESULT_OK)
    }

    /// `content` when it is a string
    pub fn content_str(&self) -> Option<&str> {
        self.content.as_str()
    }
}

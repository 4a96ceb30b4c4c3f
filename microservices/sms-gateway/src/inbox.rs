//! Inbox decoding for `queryrxsms` responses
//!
//! Firmware answers in one of two shapes. The shape is inspected once into an
//! [`InboxContent`] and each shape has its own decoder.
//!
//! Log shape example:
//!
//! ```text
//! total:2;20251219203330:2(-1)(-1):5493815682688:Hola|E;20251219203336:2(-1)(-1):5493815682688:Quien sos|E
//! ```

use regex::Regex;
use serde_json::Value;
use smsgate_core::ReceivedMessage;
use smsgate_proto::GatewayEnvelope;

const END_FLAG: &str = "|E";

/// Runtime shape of an inbox `content` field
#[derive(Debug, Clone, PartialEq)]
pub enum InboxContent {
    /// Already-structured records
    Records(Vec<Value>),
    /// `total:<N>;…` text log
    Log(String),
    /// Anything else (null, number, object)
    Unrecognized,
}

impl InboxContent {
    pub fn from_envelope(envelope: &GatewayEnvelope) -> Self {
        Self::from_value(&envelope.content)
    }

    pub fn from_value(content: &Value) -> Self {
        match content {
            Value::Array(items) => Self::Records(items.clone()),
            Value::String(text) => Self::Log(text.clone()),
            _ => Self::Unrecognized,
        }
    }
}

pub struct ReceivedMessageParser {
    total_pattern: Regex,
}

impl ReceivedMessageParser {
    pub fn new() -> Self {
        Self {
            total_pattern: Regex::new(r"total:(\d+)").expect("valid inbox total pattern"),
        }
    }

    pub fn parse(&self, content: &InboxContent) -> Vec<ReceivedMessage> {
        match content {
            InboxContent::Records(items) => parse_records(items),
            InboxContent::Log(text) => self.parse_log(text),
            InboxContent::Unrecognized => {
                tracing::debug!("Inbox content has no known shape");
                Vec::new()
            }
        }
    }

    /// Decode the delimited text log. Segments with fewer than four
    /// `:`-separated fields are skipped.
    pub fn parse_log(&self, content: &str) -> Vec<ReceivedMessage> {
        let total = self
            .total_pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok());

        match total {
            None | Some(0) => return Vec::new(),
            Some(_) => {}
        }

        content
            .split(';')
            .skip(1)
            .filter(|segment| !segment.trim().is_empty())
            .filter_map(parse_log_segment)
            .collect()
    }
}

impl Default for ReceivedMessageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// `<TIME>:<PORTINFO>:<PHONE>:<MSG>|E`; the message may itself contain `:`
fn parse_log_segment(segment: &str) -> Option<ReceivedMessage> {
    let fields: Vec<&str> = segment.split(':').collect();
    if fields.len() < 4 {
        tracing::debug!(segment = %segment, "Skipping short inbox segment");
        return None;
    }

    let raw_message = fields[3..].join(":");
    let raw_message = raw_message.trim();
    let message = raw_message.strip_suffix(END_FLAG).unwrap_or(raw_message);

    Some(ReceivedMessage {
        phone: fields[2].trim().to_string(),
        message: message.trim().to_string(),
        time: fields[0].trim().to_string(),
        port: leading_digits(fields[1].trim()).to_string(),
    })
}

/// `2(-1)(-1)` -> `2`
fn leading_digits(token: &str) -> &str {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    &token[..end]
}

/// Decode already-structured records; non-object entries are skipped and
/// missing fields become empty strings.
pub fn parse_records(items: &[Value]) -> Vec<ReceivedMessage> {
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| ReceivedMessage {
            phone: field(item, &["num", "srcnum"]),
            message: field(item, &["smsinfo"]),
            time: field(item, &["time", "rxtime"]),
            port: field(item, &["port"]),
        })
        .collect()
}

/// First non-empty key among `keys`, stringified and trimmed
fn field(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .filter_map(|value| match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

//! Port and connection state decoding for `getportinfo` / `getportconnectstate`

use regex::Regex;
use smsgate_core::{ConnectState, PortState};

pub struct PortStatusDecoder {
    port_state_pattern: Regex,
    connect_state_pattern: Regex,
}

impl PortStatusDecoder {
    pub fn new() -> Self {
        Self {
            port_state_pattern: Regex::new(r"portstate:([0-9,]+)")
                .expect("valid port state pattern"),
            connect_state_pattern: Regex::new(r"ConnectState:([0-9,]+)")
                .expect("valid connect state pattern"),
        }
    }

    /// `…portstate:0,0,11,2;…` -> one state per port, in port order
    pub fn port_states(&self, content: &str) -> Vec<PortState> {
        codes(&self.port_state_pattern, content)
            .into_iter()
            .map(PortState::from_code)
            .collect()
    }

    /// `…ConnectState:1,1,0,5…` -> one state per port, in port order
    pub fn connect_states(&self, content: &str) -> Vec<ConnectState> {
        codes(&self.connect_state_pattern, content)
            .into_iter()
            .map(ConnectState::from_code)
            .collect()
    }
}

impl Default for PortStatusDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn codes(pattern: &Regex, content: &str) -> Vec<u32> {
    pattern
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .split(',')
                .filter_map(|code| code.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_states() {
        let decoder = PortStatusDecoder::new();
        let states = decoder.port_states("total:4;portstate:0,3,11,8;");

        assert_eq!(
            states,
            vec![
                PortState::Idle,
                PortState::Talking,
                PortState::Unavailable,
                PortState::Other(8),
            ]
        );
    }

    #[test]
    fn test_connect_states() {
        let decoder = PortStatusDecoder::new();
        let states = decoder.connect_states("ConnectState:1,0,5");

        assert_eq!(
            states,
            vec![
                ConnectState::Connected,
                ConnectState::Unconnected,
                ConnectState::Roaming,
            ]
        );
    }

    #[test]
    fn test_missing_markers() {
        let decoder = PortStatusDecoder::new();
        assert!(decoder.port_states("ConnectState:1,1").is_empty());
        assert!(decoder.connect_states("").is_empty());
    }

    #[test]
    fn test_trailing_comma_is_ignored() {
        let decoder = PortStatusDecoder::new();
        assert_eq!(decoder.port_states("portstate:0,;").len(), 1);
    }
}

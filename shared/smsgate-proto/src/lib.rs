//! smsgate protocol types
//!
//! Wire commands and response envelopes for the Synway gateway HTTP API,
//! plus the JSON wrapper used by the service's own API.

pub mod command;
pub mod common;
pub mod envelope;

pub use command::{GatewayCommand, ALL_PORTS, AUTO_PORT};
pub use common::*;
pub use envelope::GatewayEnvelope;

//! SMS gateway service
//!
//! Client for Synway-style GSM gateways and a bulk dispatcher on top of it:
//! - JSON command codec and HTTP transport with Basic auth
//! - Round-robin port assignment with a fixed inter-message delay
//! - Inbox parsing for both content shapes the firmware emits
//! - Port and registration state decoding
//! - JSON HTTP API and CSV export of received messages

pub mod api;
pub mod client;
pub mod codec;
pub mod dispatcher;
pub mod export;
pub mod inbox;
pub mod metrics;
pub mod port_status;
pub mod service;
pub mod time_window;
pub mod transport;

pub use api::{create_router, AppState};
pub use client::{GatewayClient, GatewayStatus, PortReport, TaskStatusReport};
pub use codec::{detect_encoding, ProtocolCodec, SendAck};
pub use dispatcher::{port_for_index, CampaignDispatcher, Throttle, TokioThrottle};
pub use inbox::{InboxContent, ReceivedMessageParser};
pub use metrics::DispatchMetrics;
pub use port_status::PortStatusDecoder;
pub use service::SmsGatewayService;
pub use time_window::TimeWindow;
pub use transport::{GatewayReply, HttpTransport, Transport};

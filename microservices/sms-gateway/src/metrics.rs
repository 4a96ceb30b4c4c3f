//! Dispatch counters exposed at `/metrics`

use serde::Serialize;
use smsgate_telemetry::{Counter, Gauge, Histogram, HistogramSummary};

#[derive(Clone)]
pub struct DispatchMetrics {
    pub sends_attempted: Counter,
    pub sends_succeeded: Counter,
    pub sends_failed: Counter,
    pub campaigns_active: Gauge,
    pub send_latency_ms: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub sends_attempted: u64,
    pub sends_succeeded: u64,
    pub sends_failed: u64,
    pub campaigns_active: u64,
    pub send_latency_ms: HistogramSummary,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self {
            sends_attempted: Counter::new("sms_sends_attempted_total"),
            sends_succeeded: Counter::new("sms_sends_succeeded_total"),
            sends_failed: Counter::new("sms_sends_failed_total"),
            campaigns_active: Gauge::new("sms_campaigns_active"),
            send_latency_ms: Histogram::with_capacity("sms_send_latency_ms", 1000),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sends_attempted: self.sends_attempted.get(),
            sends_succeeded: self.sends_succeeded.get(),
            sends_failed: self.sends_failed.get(),
            campaigns_active: self.campaigns_active.get(),
            send_latency_ms: self.send_latency_ms.summary(),
        }
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

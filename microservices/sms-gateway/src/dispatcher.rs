//! Bulk dispatch: sequential, round-robin port assignment with a fixed
//! pause between consecutive sends

use async_trait::async_trait;
use smsgate_core::{CampaignId, CampaignReport, DispatchSettings, Recipient, SendResult};
use smsgate_proto::AUTO_PORT;
use smsgate_telemetry::Gauge;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, Instrument};

use crate::client::GatewayClient;
use crate::metrics::DispatchMetrics;

/// Pause between two sends
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self, delay: Duration);
}

pub struct TokioThrottle;

#[async_trait]
impl Throttle for TokioThrottle {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// 1-based port for the recipient at `index`
pub fn port_for_index(index: usize, port_count: u8) -> u8 {
    let count = usize::from(port_count.max(1));
    (index % count) as u8 + 1
}

/// Holds `campaigns_active` raised until dropped
struct ActiveCampaign(Gauge);

impl ActiveCampaign {
    fn enter(gauge: &Gauge) -> Self {
        gauge.inc();
        Self(gauge.clone())
    }
}

impl Drop for ActiveCampaign {
    fn drop(&mut self) {
        self.0.dec();
    }
}

pub struct CampaignDispatcher {
    client: Arc<GatewayClient>,
    throttle: Arc<dyn Throttle>,
    metrics: DispatchMetrics,
}

impl CampaignDispatcher {
    pub fn new(client: Arc<GatewayClient>, metrics: DispatchMetrics) -> Self {
        Self::with_throttle(client, Arc::new(TokioThrottle), metrics)
    }

    pub fn with_throttle(
        client: Arc<GatewayClient>,
        throttle: Arc<dyn Throttle>,
        metrics: DispatchMetrics,
    ) -> Self {
        Self {
            client,
            throttle,
            metrics,
        }
    }

    pub fn client(&self) -> &Arc<GatewayClient> {
        &self.client
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// One result per recipient, in input order. A failed send is recorded
    /// and the campaign moves on.
    pub async fn send_bulk(
        &self,
        recipients: &[Recipient],
        settings: &DispatchSettings,
    ) -> Vec<SendResult> {
        let mut results = Vec::with_capacity(recipients.len());
        let delay = settings.delay();
        let port_dispatch = self.client.config().port_dispatch();

        for (index, recipient) in recipients.iter().enumerate() {
            let assigned = port_for_index(index, settings.port_count());
            let port = if port_dispatch {
                assigned.to_string()
            } else {
                AUTO_PORT.to_string()
            };

            info!(
                index = index + 1,
                total = recipients.len(),
                phone = %recipient.phone,
                assigned_port = assigned,
                port = %port,
                "Sending SMS"
            );

            self.metrics.sends_attempted.inc();
            let started = Instant::now();
            let result = self.client.send_to(recipient, &port).await;
            self.metrics
                .send_latency_ms
                .record(started.elapsed().as_secs_f64() * 1000.0);

            if result.success {
                self.metrics.sends_succeeded.inc();
            } else {
                self.metrics.sends_failed.inc();
            }
            results.push(result);

            if !delay.is_zero() && index + 1 < recipients.len() {
                self.throttle.pause(delay).await;
            }
        }

        results
    }

    /// `send_bulk` under a fresh campaign id, summarized
    pub async fn run_campaign(
        &self,
        recipients: &[Recipient],
        settings: &DispatchSettings,
    ) -> CampaignReport {
        let campaign_id = CampaignId::generate();
        let span = info_span!("campaign", campaign_id = %campaign_id);

        async {
            info!(
                recipients = recipients.len(),
                delay_ms = settings.delay().as_millis() as u64,
                port_count = settings.port_count(),
                "Campaign started"
            );
            let _active = ActiveCampaign::enter(&self.metrics.campaigns_active);

            let results = self.send_bulk(recipients, settings).await;

            let report = CampaignReport::new(campaign_id.clone(), results);
            info!(
                total = report.total,
                sent = report.sent,
                failed = report.failed,
                "Campaign finished"
            );
            report
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_campaign_guard_lowers_gauge_on_drop() {
        let gauge = Gauge::new("campaigns");
        {
            let _outer = ActiveCampaign::enter(&gauge);
            let _inner = ActiveCampaign::enter(&gauge);
            assert_eq!(gauge.get(), 2);
        }
        assert_eq!(gauge.get(), 0);
    }

    #[test]
    fn test_port_rotation() {
        let ports: Vec<u8> = (0..10).map(|i| port_for_index(i, 4)).collect();
        assert_eq!(ports, vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2]);
    }

    #[test]
    fn test_single_port() {
        assert!((0..6).all(|i| port_for_index(i, 1) == 1));
    }

    #[test]
    fn test_max_ports() {
        assert_eq!(port_for_index(7, 8), 8);
        assert_eq!(port_for_index(8, 8), 1);
    }
}

//! `SmsgateService` implementation: HTTP API plus gateway readiness

use async_trait::async_trait;
use smsgate_core::{
    DependencyStatus, DispatchSettings, GatewayConfig, HealthStatus, ReadinessStatus, Result,
    ServiceConfig, SmsgateService,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::client::GatewayClient;
use crate::dispatcher::CampaignDispatcher;
use crate::metrics::DispatchMetrics;

pub struct SmsGatewayService {
    config: ServiceConfig,
    state: AppState,
    shutdown: Arc<Notify>,
    start_time: Instant,
}

impl SmsGatewayService {
    pub fn new(
        config: ServiceConfig,
        gateway: GatewayConfig,
        settings: DispatchSettings,
    ) -> Result<Self> {
        info!(
            gateway = %gateway.base_url(),
            send_endpoint = gateway.send_endpoint(),
            query_endpoint = gateway.query_endpoint(),
            port_dispatch = gateway.port_dispatch(),
            delay_ms = settings.delay().as_millis() as u64,
            port_count = settings.port_count(),
            "Initializing SMS gateway service"
        );

        let client = Arc::new(GatewayClient::connect(gateway)?);
        let dispatcher = Arc::new(CampaignDispatcher::new(client, DispatchMetrics::new()));

        Ok(Self::with_state(config, AppState::new(dispatcher, settings)))
    }

    pub fn with_state(config: ServiceConfig, state: AppState) -> Self {
        Self {
            config,
            state,
            shutdown: Arc::new(Notify::new()),
            start_time: Instant::now(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

#[async_trait]
impl SmsgateService for SmsGatewayService {
    fn service_id(&self) -> &'static str {
        "sms-gateway"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        let client = self.state.dispatcher.client();
        let started = Instant::now();
        let available = client.check_reachable().await;

        ReadinessStatus {
            ready: available,
            dependencies: vec![DependencyStatus {
                name: "gateway".to_string(),
                available,
                latency_ms: Some(started.elapsed().as_millis() as u64),
            }],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down SMS gateway service");
        self.shutdown.notify_one();

        self.state.drain_campaigns().await;
        info!("In-flight campaigns finished");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(http_addr = %self.config.http_bind_address, "Starting HTTP API");

        let app = create_router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(&self.config.http_bind_address).await?;

        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await?;

        Ok(())
    }
}

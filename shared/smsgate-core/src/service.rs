//! Service lifecycle shared by the gateway microservices

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::error::{GatewayError, Result};

/// Time the server gets to stop after `shutdown` returns
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Health status for liveness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub service_id: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness status for readiness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub ready: bool,
    pub dependencies: Vec<DependencyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub latency_ms: Option<u64>,
}

/// Lifecycle every service process implements
#[async_trait]
pub trait SmsgateService: Send + Sync + 'static {
    /// Service identifier (e.g., "sms-gateway")
    fn service_id(&self) -> &'static str;

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Health check - is the service alive?
    async fn health(&self) -> HealthStatus;

    /// Readiness check - is the gateway reachable?
    async fn ready(&self) -> ReadinessStatus;

    async fn shutdown(&self) -> Result<()>;

    /// Start the HTTP surface; returns when the server stops
    async fn start(&self) -> Result<()>;
}

/// Standard bootstrap: start the service, wait for a signal, shut down
pub struct MicroserviceRuntime {
    config: ServiceConfig,
    start_time: std::time::Instant,
}

impl MicroserviceRuntime {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run a service until Ctrl+C / SIGTERM or until it stops on its own
    pub async fn run<S: SmsgateService>(&self, service: Arc<S>) -> Result<()> {
        info!(
            service_id = service.service_id(),
            service_name = %self.config.service_name,
            version = service.version(),
            "Starting microservice"
        );

        let service_clone = service.clone();
        let mut service_handle = tokio::spawn(async move { service_clone.start().await });

        tokio::select! {
            _ = Self::wait_for_shutdown() => {
                info!("Shutdown signal received, gracefully stopping...");
            }
            joined = &mut service_handle => {
                return match joined {
                    Ok(Ok(())) => {
                        warn!("Service stopped without a shutdown signal");
                        Ok(())
                    }
                    Ok(Err(e)) => {
                        error!(error = %e, "Service failed");
                        Err(e)
                    }
                    Err(e) => Err(GatewayError::Internal(format!("Service task failed: {}", e))),
                };
            }
        }

        if let Err(e) = service.shutdown().await {
            warn!("Error during shutdown: {}", e);
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, &mut service_handle).await {
            Ok(Ok(Err(e))) => warn!(error = %e, "Service reported an error while stopping"),
            Ok(_) => {}
            Err(_) => {
                warn!(
                    grace_seconds = SHUTDOWN_GRACE.as_secs(),
                    "Service did not stop in time, aborting"
                );
                service_handle.abort();
            }
        }

        info!(
            uptime_seconds = self.start_time.elapsed().as_secs(),
            "Microservice stopped"
        );

        Ok(())
    }

    async fn wait_for_shutdown() {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}

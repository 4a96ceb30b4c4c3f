//! SMS gateway microservice

use smsgate_core::{
    DispatchSettings, GatewayConfig, GatewayError, MicroserviceRuntime, Result, ServiceConfig,
};
use sms_gateway::SmsGatewayService;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env()?;

    smsgate_telemetry::init(&config.service_name, &config.log_level)
        .map_err(|e| GatewayError::Config(e.to_string()))?;

    info!("Starting SMS gateway microservice");

    let gateway = GatewayConfig::from_env()?;
    let settings = DispatchSettings::from_env()?;

    let service = Arc::new(SmsGatewayService::new(config.clone(), gateway, settings)?);
    MicroserviceRuntime::new(config).run(service).await
}

//! smsgate core - shared domain types and service infrastructure
//!
//! This crate provides:
//! - Gateway, dispatch and service configuration
//! - Domain types (recipients, send results, delivery and port states)
//! - Error handling utilities
//! - The service trait and runtime bootstrap

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::{DispatchSettings, GatewayConfig, Protocol, ServiceConfig};
pub use domain::*;
pub use error::{GatewayError, Result};
pub use service::{
    DependencyStatus, HealthStatus, MicroserviceRuntime, ReadinessStatus, SmsgateService,
};

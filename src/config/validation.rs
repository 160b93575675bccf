//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Render the default target template and check every target URI
//! - Validate addresses and limits
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::router::{parse_target, resolve_default_target, RoutingError};

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("routing.default_target_template: {0}")]
    DefaultTarget(RoutingError),

    #[error("routing.rules[{index}].trigger must not be empty")]
    EmptyTrigger { index: usize },

    #[error("routing.rules[{index}].target: {source}")]
    RuleTarget { index: usize, source: RoutingError },

    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if let Err(e) = resolve_default_target(&config.routing) {
        errors.push(ValidationError::DefaultTarget(e));
    }

    for (index, rule) in config.routing.rules.iter().enumerate() {
        if rule.trigger.is_empty() {
            errors.push(ValidationError::EmptyTrigger { index });
        }
        if let Err(source) = parse_target(&rule.target) {
            errors.push(ValidationError::RuleTarget { index, source });
        }
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Body-based routing rules and the default target.
    #[serde(alias = "ProxyConfiguration")]
    pub routing: RoutingConfig,

    /// Outbound client tuning.
    pub upstream: UpstreamConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Routing configuration: which upstream receives which body.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Format string for the fallback target; `{0}` is replaced by `stage`.
    #[serde(alias = "DefaultURL")]
    pub default_target_template: String,

    /// Deployment stage substituted into the default template.
    #[serde(alias = "Stage")]
    pub stage: String,

    /// Ordered rules, first match wins.
    #[serde(alias = "RedirectQueries")]
    pub rules: Vec<RuleConfig>,
}

/// A single body-substring rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleConfig {
    /// Substring looked up in the decoded request body.
    #[serde(alias = "Query")]
    pub trigger: String,

    /// Absolute URI requests are forwarded to when `trigger` matches.
    #[serde(alias = "RedirectURL")]
    pub target: String,
}

impl RuleConfig {
    pub fn new(trigger: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            target: target.into(),
        }
    }
}

/// Outbound client configuration.
///
/// There is deliberately no request timeout here: an in-flight upstream call
/// lives exactly as long as the caller's request does.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// TCP connect timeout in seconds (0 = none).
    pub connect_timeout_secs: u64,

    /// How long idle pooled connections are kept, in seconds.
    pub pool_idle_timeout_secs: u64,

    /// Offer HTTP/2 to TLS upstreams via ALPN.
    pub http2: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            pool_idle_timeout_secs: 90,
            http2: false,
        }
    }
}

/// Inbound limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes that is buffered for routing.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

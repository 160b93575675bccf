//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML or JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into the routing table and upstream client at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError, ConfigFormat};
pub use schema::GatewayConfig;
pub use schema::{
    LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, RoutingConfig, RuleConfig,
    UpstreamConfig,
};

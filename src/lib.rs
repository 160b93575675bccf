//! Content-aware reverse proxy.
//!
//! Every inbound request is routed by looking at its body: the first
//! configured trigger substring found in the body picks the upstream, and
//! requests matching nothing go to a default target rendered from a template
//! and a stage name. The request is then rebuilt against that upstream and the
//! upstream response is streamed back.

// Core subsystems
pub mod config;
pub mod http;
pub mod proxy;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{Forwarder, Outcome, ProxyError};

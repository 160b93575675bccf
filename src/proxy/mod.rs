//! Content-aware forwarding core.
//!
//! [`Forwarder`] is the single entry point per request. It never decides what
//! "not handled" means; it returns [`Outcome::NotHandled`] and lets the
//! surrounding pipeline choose.

pub mod engine;
pub mod error;

pub use engine::{BuildError, Forwarder, Outcome};
pub use error::ProxyError;

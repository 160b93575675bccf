//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Buffered request body (bytes)
//!     → matcher.rs (BOM-stripping lossy UTF-8 decode, substring test)
//!     → router.rs (ordered rule scan)
//!     → Return: matched rule, default target, or no route
//!
//! Route Compilation (at startup):
//!     RoutingConfig
//!     → template.rs (render default target with stage)
//!     → Parse every target into an absolute Uri
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same body always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;
pub mod template;

pub use router::{Route, RouteMatch, Router, RoutingError};

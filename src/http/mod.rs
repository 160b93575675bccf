//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → body.rs (buffer the body once, keep it replayable)
//!     → [routing decides the target]
//!     → request.rs (rebuild the request against the target)
//!     → client.rs (shared pooled upstream client)
//!     → response.rs (copy status/headers, stream body back)
//!     → Send to client
//! ```

pub mod body;
pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use server::HttpServer;

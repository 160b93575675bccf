//! The forwarding engine.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → http::body (buffer body once, keep it replayable)
//!     → routing::Router (first rule whose trigger is in the body, else default)
//!     → http::request (rebuild request against the target)
//!     → shared upstream client (returns at response headers)
//!     → http::response (copy status/headers, stream body)
//!     → Outcome::Forwarded(Response<Body>)
//! ```
//!
//! # Design Decisions
//! - No per-request mutable shared state; cloning the engine is an `Arc` bump
//! - No timeout and no retry: the caller's request future owns the upstream
//!   call, so dropping it cancels the upstream request too

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::http::body::PeekedBody;
use crate::http::client::{build_client, ClientError, UpstreamClient};
use crate::http::request::build_upstream_request;
use crate::http::response::relay_response;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::routing::{Router, RoutingError};

/// What happened to a request.
#[derive(Debug)]
pub enum Outcome {
    /// The request was sent upstream; this is the relayed response.
    Forwarded(Response<Body>),
    /// No target applies. The request is handed back intact, body included,
    /// for the caller's next handler.
    NotHandled(Request<Body>),
}

/// Error constructing a [`Forwarder`] from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

struct Inner {
    router: Router,
    client: UpstreamClient,
    max_body_size: usize,
}

/// Content-aware forwarding engine, shared by all in-flight requests.
#[derive(Clone)]
pub struct Forwarder {
    inner: Arc<Inner>,
}

impl Forwarder {
    pub fn new(router: Router, client: UpstreamClient, max_body_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                router,
                client,
                max_body_size,
            }),
        }
    }

    /// Compile the routing table and build the upstream client.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, BuildError> {
        let router = Router::from_config(&config.routing)?;
        let client = build_client(&config.upstream)?;
        Ok(Self::new(router, client, config.limits.max_body_size))
    }

    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    /// Route, rebuild, send and relay one request.
    pub async fn forward(&self, request: Request<Body>) -> Result<Outcome, ProxyError> {
        let start_time = Instant::now();
        let (parts, body) = request.into_parts();
        let method = parts.method.to_string();
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let body = PeekedBody::read(body, self.inner.max_body_size).await?;

        let route = match self.inner.router.match_body(body.as_bytes()) {
            Some(route) => route,
            None => {
                tracing::debug!(request_id = %request_id, "No target for request body");
                return Ok(Outcome::NotHandled(Request::from_parts(parts, body.replay())));
            }
        };

        tracing::info!(
            request_id = %request_id,
            upstream = %route.target(),
            route = route.label(),
            "Redirecting request"
        );

        let outbound = build_upstream_request(&parts, &body, route.target())?;

        match self.inner.client.request(outbound).await {
            Ok(upstream) => {
                let status = upstream.status().as_u16();
                metrics::record_request(&method, status, route.label(), start_time);
                tracing::debug!(
                    request_id = %request_id,
                    status = %upstream.status(),
                    "Upstream responded"
                );
                Ok(Outcome::Forwarded(relay_response(upstream)))
            }
            Err(e) => {
                metrics::record_request(&method, 502, route.label(), start_time);
                tracing::error!(
                    request_id = %request_id,
                    upstream = %route.target(),
                    error = %e,
                    "Upstream error"
                );
                Err(ProxyError::Upstream(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuleConfig, UpstreamConfig};
    use crate::routing::Route;

    fn client() -> UpstreamClient {
        build_client(&UpstreamConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn not_handled_returns_request_intact() {
        let router = Router::new(
            vec![Route::new("checkout", "http://127.0.0.1:9/".parse().unwrap())],
            None,
        );
        let forwarder = Forwarder::new(router, client(), 1024);

        let request = Request::post("/ingest")
            .header("x-custom", "1")
            .body(Body::from("ping"))
            .unwrap();

        match forwarder.forward(request).await.unwrap() {
            Outcome::NotHandled(request) => {
                assert_eq!(request.uri(), "/ingest");
                assert_eq!(request.headers()["x-custom"], "1");
                let body = axum::body::to_bytes(request.into_body(), usize::MAX)
                    .await
                    .unwrap();
                assert_eq!(body, "ping");
            }
            Outcome::Forwarded(_) => panic!("request without a target was forwarded"),
        }
    }

    #[tokio::test]
    async fn configured_default_always_forwards() {
        let mut config = GatewayConfig::default();
        // Nothing listens on the discard port; any outcome other than
        // NotHandled shows the request was sent.
        config.routing.default_target_template = "http://127.0.0.1:9/{0}".to_string();
        config.routing.stage = "api".to_string();
        config
            .routing
            .rules
            .push(RuleConfig::new("checkout", "http://127.0.0.1:9/checkout"));
        let forwarder = Forwarder::from_config(&config).unwrap();

        for body in ["ping", "", "checkout"] {
            let request = Request::post("/").body(Body::from(body)).unwrap();
            match forwarder.forward(request).await {
                Ok(Outcome::NotHandled(_)) => panic!("default target configured"),
                Ok(Outcome::Forwarded(_)) => {}
                Err(e) => assert!(matches!(e, ProxyError::Upstream(_)), "{e}"),
            }
        }
    }

    #[tokio::test]
    async fn oversized_body_fails_before_routing() {
        let mut config = GatewayConfig::default();
        config.routing.default_target_template = "http://127.0.0.1:9/".to_string();
        config.limits.max_body_size = 4;
        let forwarder = Forwarder::from_config(&config).unwrap();

        let request = Request::post("/").body(Body::from("too long")).unwrap();
        let err = forwarder.forward(request).await.unwrap_err();
        assert!(matches!(err, ProxyError::PayloadTooLarge { limit: 4 }));
    }
}

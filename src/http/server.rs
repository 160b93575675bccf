//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router that sends every path and method to the forwarder
//! - Wire up middleware (request ID, tracing)
//! - Translate forwarding outcomes and errors into responses
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::proxy::{BuildError, Forwarder, Outcome};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    forwarder: Forwarder,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the routing table cannot be compiled, so a bad default target
    /// never gets as far as serving traffic.
    pub fn new(config: GatewayConfig) -> Result<Self, BuildError> {
        let forwarder = Forwarder::from_config(&config)?;
        let router = Self::build_router(AppState {
            forwarder: forwarder.clone(),
        });

        Ok(Self {
            router,
            config,
            forwarder,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rules = self.forwarder.router().routes().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.forwarder.forward(request).await {
        Ok(Outcome::Forwarded(response)) => response,
        Ok(Outcome::NotHandled(request)) => {
            tracing::warn!(path = %request.uri().path(), "No route matched");
            (StatusCode::NOT_FOUND, "No matching route found").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, status = %e.status(), "Request not forwarded");
            e.into_response()
        }
    }
}

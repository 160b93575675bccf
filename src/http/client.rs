//! Shared upstream HTTP client.
//!
//! One pooled client is built at startup and cloned into every request. It
//! has no request timeout: an upstream call lives as long as the inbound
//! request future, and dropping that future (client disconnect) drops the
//! upstream call and its connection.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};
use rustls::{ClientConfig, RootCertStore};
use thiserror::Error;

use crate::config::UpstreamConfig;

/// Client type used for every upstream call.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Error building the upstream client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),
}

fn native_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for error in &native.errors {
        tracing::warn!(error = %error, "Failed to load native root certificate");
    }

    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    tracing::debug!(added, ignored, "Loaded native root certificates");
    roots
}

/// Build the shared upstream client.
pub fn build_client(config: &UpstreamConfig) -> Result<UpstreamClient, ClientError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(native_roots())
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    if config.connect_timeout_secs > 0 {
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
    }

    let builder = HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http();
    let connector = if config.http2 {
        builder.enable_all_versions().wrap_connector(http)
    } else {
        builder.enable_http1().wrap_connector(http)
    };

    let client = Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
        .pool_timer(TokioTimer::new())
        .build(connector);

    tracing::debug!(
        connect_timeout_secs = config.connect_timeout_secs,
        pool_idle_timeout_secs = config.pool_idle_timeout_secs,
        http2 = config.http2,
        "Upstream client ready"
    );

    Ok(client)
}

//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Uri};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use content_gateway::config::{GatewayConfig, RuleConfig};
use content_gateway::{HttpServer, Shutdown};

/// What an upstream saw.
#[derive(Debug)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Captured {
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

/// Gateway config with a default target and the given rules.
pub fn gateway_config(default_target: &str, rules: &[(&str, &str)]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.routing.default_target_template = default_target.to_string();
    config.routing.rules = rules
        .iter()
        .map(|(trigger, target)| RuleConfig::new(*trigger, *target))
        .collect();
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(mut config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Start an upstream that records every request and answers with its name.
pub async fn start_recording_backend(
    name: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let tx = tx.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_default();
            let _ = tx.send(Captured {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });
            ([("x-backend", name)], name)
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, rx)
}

/// Read from `socket` until the end of the request head.
pub async fn read_head(socket: &mut TcpStream) -> Vec<u8> {
    let mut head = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                head.extend_from_slice(&chunk[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    head
}

/// Start an upstream that writes `response` verbatim to every connection.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_head(&mut socket).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                let mut rest = Vec::new();
                let _ = socket.read_to_end(&mut rest).await;
            });
        }
    });

    addr
}

/// Start an upstream that reads the request and never answers.
///
/// `received` fires once the request head arrived, `closed` once the peer
/// closed the connection.
pub async fn start_hanging_backend() -> (SocketAddr, oneshot::Receiver<()>, oneshot::Receiver<()>)
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (received_tx, received_rx) = oneshot::channel();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_head(&mut socket).await;
        let _ = received_tx.send(());

        let mut chunk = [0u8; 1024];
        loop {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    (addr, received_rx, closed_rx)
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

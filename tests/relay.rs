//! Response relay behaviour, observed on the engine's own output.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use content_gateway::{Forwarder, Outcome};

mod common;

async fn forward_get(forwarder: &Forwarder) -> axum::http::Response<Body> {
    let request = Request::get("http://gateway.local/").body(Body::empty()).unwrap();
    match forwarder.forward(request).await.unwrap() {
        Outcome::Forwarded(response) => response,
        Outcome::NotHandled(_) => panic!("default target configured, request must be forwarded"),
    }
}

#[tokio::test]
async fn test_service_unavailable_relayed_without_transfer_encoding() {
    let upstream = common::start_raw_backend(
        "HTTP/1.1 503 Service Unavailable\r\n\
         Transfer-Encoding: chunked\r\n\
         Retry-After: 5\r\n\
         Connection: close\r\n\
         \r\n\
         4\r\nbusy\r\n0\r\n\r\n",
    )
    .await;
    let config = common::gateway_config(&format!("http://{upstream}/"), &[]);
    let forwarder = Forwarder::from_config(&config).unwrap();

    let response = forward_get(&forwarder).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().get("transfer-encoding").is_none());
    assert_eq!(response.headers()["retry-after"], "5");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, "busy");
}

#[tokio::test]
async fn test_status_and_headers_match_upstream() {
    let upstream = common::start_raw_backend(
        "HTTP/1.1 201 Created\r\n\
         Content-Type: application/json\r\n\
         Set-Cookie: a=1\r\n\
         Set-Cookie: b=2\r\n\
         X-Upstream: orders\r\n\
         Content-Length: 11\r\n\
         Connection: close\r\n\
         \r\n\
         {\"ok\":true}",
    )
    .await;
    let config = common::gateway_config(&format!("http://{upstream}/"), &[]);
    let forwarder = Forwarder::from_config(&config).unwrap();

    let response = forward_get(&forwarder).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["x-upstream"], "orders");
    assert_eq!(headers["content-length"], "11");
    assert_eq!(headers["connection"], "close");
    let cookies: Vec<_> = headers
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(cookies, vec!["a=1", "b=2"]);
    assert_eq!(headers.len(), 6);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_response_streams_before_upstream_finishes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = listener.local_addr().unwrap();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        common::read_head(&mut socket).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nfirst\r\n")
            .await
            .unwrap();
        let _ = release_rx.await;
        socket
            .write_all(b"6\r\nsecond\r\n0\r\n\r\n")
            .await
            .unwrap();
        let mut rest = Vec::new();
        let _ = socket.read_to_end(&mut rest).await;
    });

    let config = common::gateway_config(&format!("http://{upstream}/"), &[]);
    let forwarder = Forwarder::from_config(&config).unwrap();

    // Headers and the first chunk arrive while the upstream is still blocked.
    let response = tokio::time::timeout(Duration::from_secs(5), forward_get(&forwarder))
        .await
        .expect("response headers were not relayed before the body finished");
    assert!(response.headers().get("transfer-encoding").is_none());

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("first chunk was not streamed")
        .unwrap()
        .unwrap();
    assert_eq!(frame.into_data().unwrap(), "first");

    release_tx.send(()).unwrap();
    let rest = body.collect().await.unwrap().to_bytes();
    assert_eq!(rest, "second");
}

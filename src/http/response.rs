//! Response relay.
//!
//! # Responsibilities
//! - Copy upstream status and headers onto the caller's response
//! - Drop the upstream `transfer-encoding`; the server re-frames the body
//! - Stream the upstream body through without buffering it
//!
//! # Design Decisions
//! - Called as soon as upstream headers arrive
//! - A body error mid-stream only aborts this one connection

use axum::body::{Body, Bytes, HttpBody};
use axum::http::header::TRANSFER_ENCODING;
use axum::http::Response;
use axum::BoxError;

/// Turn an upstream response into the response returned to the caller.
pub fn relay_response<B>(upstream: Response<B>) -> Response<Body>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (parts, body) = upstream.into_parts();

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;

    let headers = response.headers_mut();
    headers.reserve(parts.headers.len());
    for (name, value) in parts.headers.iter() {
        headers.append(name.clone(), value.clone());
    }
    headers.remove(TRANSFER_ENCODING);

    response
}

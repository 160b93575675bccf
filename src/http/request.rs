//! Outbound request construction.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the resolved target URI
//! - Decide whether the method carries a body
//! - Copy headers, overwrite `Host`, re-assert `Authorization`
//!   (exactly one value, and only when it is non-blank)
//!
//! Several inbound `Authorization` headers are folded into that single value,
//! joined with `,` in arrival order.
//!
//! # Design Decisions
//! - The inbound request parts are only borrowed; nothing is mutated
//! - Header names are compared case-insensitively (`HeaderMap` semantics)
//! - Hop-by-hop and framing headers are not copied: the outbound client
//!   frames the replayed body itself and sets `content-length` to match
//! - `Expect` is consumed here: the body is already buffered, so the
//!   upstream never needs to answer `100 Continue`

use axum::body::Body;
use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONNECTION, CONTENT_LENGTH, EXPECT, HOST,
    TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::{request, Method, Request, Uri};

use crate::http::body::PeekedBody;

/// Returns false for the methods that conventionally carry no body.
pub fn carries_body(method: &Method) -> bool {
    !(method == Method::GET
        || method == Method::HEAD
        || method == Method::DELETE
        || method == Method::TRACE)
}

/// Connection-scoped headers that a proxy must not forward.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == CONNECTION
        || name == EXPECT
        || name == TE
        || name == TRAILER
        || name == TRANSFER_ENCODING
        || name == UPGRADE
        || name.as_str() == "keep-alive"
        || name.as_str() == "proxy-connection"
}

/// `Host` value for a target: its host, plus the port when one is spelled out.
pub fn host_header(target: &Uri) -> Result<HeaderValue, axum::http::Error> {
    let host = target.host().unwrap_or_default();
    let value = match target.port_u16() {
        Some(port) => HeaderValue::try_from(format!("{host}:{port}"))?,
        None => HeaderValue::from_str(host)?,
    };
    Ok(value)
}

/// The inbound `Authorization` values as one, unless missing or blank.
fn authorization(headers: &HeaderMap) -> Option<HeaderValue> {
    let mut joined = Vec::new();
    for (i, value) in headers.get_all(AUTHORIZATION).iter().enumerate() {
        if i > 0 {
            joined.push(b',');
        }
        joined.extend_from_slice(value.as_bytes());
    }
    if joined.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    HeaderValue::from_bytes(&joined).ok()
}

/// Build the request sent upstream.
///
/// The method is cloned as-is, so extension methods (`PURGE`, `PROPFIND`,
/// ...) pass through verbatim.
pub fn build_upstream_request(
    parts: &request::Parts,
    body: &PeekedBody,
    target: &Uri,
) -> Result<Request<Body>, axum::http::Error> {
    let with_body = carries_body(&parts.method);

    let mut headers = HeaderMap::with_capacity(parts.headers.len() + 2);
    for (name, value) in parts.headers.iter() {
        if name == HOST || name == CONTENT_LENGTH || name == AUTHORIZATION || is_hop_by_hop(name)
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if with_body {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
    headers.insert(HOST, host_header(target)?);
    if let Some(token) = authorization(&parts.headers) {
        headers.insert(AUTHORIZATION, token);
    }

    let mut outbound = Request::builder()
        .method(parts.method.clone())
        .uri(target.clone())
        .body(if with_body && !body.is_empty() {
            body.replay()
        } else {
            Body::empty()
        })?;
    *outbound.headers_mut() = headers;

    Ok(outbound)
}

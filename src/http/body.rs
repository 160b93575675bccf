//! Request body peeking.
//!
//! The routing decision needs the whole body as text, and the same bytes must
//! then be sent upstream. The body is collected once into a reference-counted
//! [`Bytes`] buffer: the matcher borrows it, and the forwarding step replays
//! it as a fresh [`Body`] without copying.

use axum::body::Body;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::proxy::ProxyError;

/// A fully buffered, replayable request body.
#[derive(Debug, Clone, Default)]
pub struct PeekedBody {
    bytes: Bytes,
}

impl PeekedBody {
    /// Collect `body`, failing if it is larger than `limit` bytes.
    pub async fn read(body: Body, limit: usize) -> Result<Self, ProxyError> {
        match Limited::new(body, limit).collect().await {
            Ok(collected) => Ok(Self {
                bytes: collected.to_bytes(),
            }),
            Err(e) if e.is::<LengthLimitError>() => Err(ProxyError::PayloadTooLarge { limit }),
            Err(e) => Err(ProxyError::BodyRead(e)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A new body yielding exactly the peeked bytes.
    pub fn replay(&self) -> Body {
        Body::from(self.bytes.clone())
    }
}

impl From<Bytes> for PeekedBody {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

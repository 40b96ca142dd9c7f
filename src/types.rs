//! Payload types shared by the HTTP logging layer.
//!
//! The central type is [`Body`], which models the two kinds of response
//! payload the logging layer has to care about: a fully materialized buffer
//! that can be read any number of times, and a single-use stream that is
//! gone once consumed.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;

/// Error produced while reading a streaming body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("body stream error: {0}")]
    Stream(String),
}

/// Boxed chunk stream backing a non-repeatable [`Body`].
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, BodyError>> + Send>>;

/// An HTTP payload that is either repeatable (buffered) or single-use
/// (streaming).
///
/// A buffered body can be inspected with [`Body::as_bytes`] without being
/// consumed. A streaming body can only be read once, via
/// [`Body::into_bytes`]; callers that need the bytes to survive a read must
/// substitute a fresh body afterwards (see [`Body::once`]).
pub enum Body {
    /// Fully materialized payload; readable any number of times.
    Buffered(Bytes),
    /// Single-use chunk stream; unreadable after consumption.
    Streaming(BodyStream),
}

impl Body {
    /// An empty repeatable body.
    pub fn empty() -> Self {
        Body::Buffered(Bytes::new())
    }

    /// A repeatable body over the given bytes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Body::Buffered(bytes.into())
    }

    /// A non-repeatable body backed by a chunk stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, BodyError>> + Send + 'static,
    {
        Body::Streaming(Box::pin(stream))
    }

    /// A non-repeatable in-memory body yielding exactly the given bytes.
    ///
    /// This is the replacement body installed after the logging layer has
    /// drained an original stream: same bytes, still exactly-once readable.
    pub fn once(bytes: Bytes) -> Self {
        Body::Streaming(Box::pin(futures::stream::once(async move { Ok(bytes) })))
    }

    /// Whether this body can be read more than once.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Body::Buffered(_))
    }

    /// The buffered bytes, if this body is repeatable.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Buffered(bytes) => Some(bytes),
            Body::Streaming(_) => None,
        }
    }

    /// Consume the body and collect all of its bytes.
    ///
    /// For a streaming body this drains the underlying stream to completion;
    /// the call blocks (asynchronously) until the remote end finishes sending.
    pub async fn into_bytes(self) -> Result<Bytes, BodyError> {
        match self {
            Body::Buffered(bytes) => Ok(bytes),
            Body::Streaming(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Body::Streaming(_) => f.debug_tuple("Streaming").finish(),
        }
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Body::Buffered(Bytes::from_static(value.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Buffered(Bytes::from(value))
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::Buffered(value)
    }
}

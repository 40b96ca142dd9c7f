//! HTTP exchange logging as a tower middleware.
//!
//! [`HttpLogLayer`] wraps an inner executor service and observes each
//! request/response pair that an injected predicate marks as loggable. Large
//! bodies are truncated in the log line; a non-repeatable response body that
//! had to be read for logging is replaced by an in-memory body carrying the
//! exact same bytes, so the caller still sees the full payload.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{Method, Request, Response};
use tower::{BoxError, Layer, Service};

use crate::content_type;
use crate::sink::TracingSink;
use crate::types::Body;
use crate::LogSink;

/// Bodies longer than this are cut off in the log line.
const MAX_LOGGED_BODY: usize = 1000;

type LogPredicate = Arc<dyn Fn(&Request<Body>) -> bool + Send + Sync>;

/// Tower layer producing [`HttpLoggingClient`] services.
///
/// The predicate decides per request whether the exchange is logged at all;
/// a rejected request is delegated to the inner service untouched.
///
/// # Examples
///
/// ```rust,no_run
/// use tower::ServiceBuilder;
/// use wirelog::HttpLogLayer;
///
/// let layer = HttpLogLayer::new(|_req| true);
/// # let inner = tower::service_fn(|_req: http::Request<wirelog::Body>| async {
/// #     Ok::<_, tower::BoxError>(http::Response::new(wirelog::Body::empty()))
/// # });
/// let client = ServiceBuilder::new().layer(layer).service(inner);
/// ```
#[derive(Clone)]
pub struct HttpLogLayer {
    predicate: LogPredicate,
    sink: Arc<dyn LogSink>,
}

impl HttpLogLayer {
    pub fn new(predicate: impl Fn(&Request<Body>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the default `tracing` sink.
    pub fn with_sink(mut self, sink: impl LogSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

impl<S> Layer<S> for HttpLogLayer {
    type Service = HttpLoggingClient<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpLoggingClient {
            inner,
            predicate: self.predicate.clone(),
            sink: self.sink.clone(),
        }
    }
}

/// Executor decorator that logs HTTP exchanges.
///
/// Wraps an inner `Service<Request<Body>>` and accumulates one log line per
/// loggable exchange: request line and body, then response status and body.
/// A transport failure is appended to the line as `Exception: <message>` and
/// re-raised unchanged. Users typically obtain this type through
/// [`HttpLogLayer`].
#[derive(Clone)]
pub struct HttpLoggingClient<S> {
    inner: S,
    predicate: LogPredicate,
    sink: Arc<dyn LogSink>,
}

impl<S> Service<Request<Body>> for HttpLoggingClient<S>
where
    S: Service<Request<Body>, Response = Response<Body>, Error = BoxError>,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        if !(self.predicate)(&request) {
            return Box::pin(self.inner.call(request));
        }

        let mut tokens = vec![request.method().to_string(), request.uri().to_string()];
        if request.method() != Method::GET {
            tokens.push("-d".to_string());
            if content_type::loggable(request.headers()) {
                if let Some(bytes) = request.body().as_bytes() {
                    if !bytes.is_empty() {
                        tokens.push(truncated(&String::from_utf8_lossy(bytes)));
                    }
                }
            }
        }

        let sink = self.sink.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            match future.await {
                Ok(mut response) => {
                    tokens.push("***RESPONSE***".to_string());
                    tokens.push(response.status().as_u16().to_string());
                    if let Some(reason) = response.status().canonical_reason() {
                        tokens.push(reason.to_string());
                    }

                    if content_type::loggable(response.headers()) {
                        if response.body().is_repeatable() {
                            if let Some(bytes) = response.body().as_bytes() {
                                tokens.push(truncated(&String::from_utf8_lossy(bytes)));
                            }
                        } else {
                            // Logging consumes the single-use stream, so the
                            // drained bytes are re-wrapped into a fresh
                            // in-memory body before the response is returned.
                            let body = std::mem::replace(response.body_mut(), Body::empty());
                            match body.into_bytes().await {
                                Ok(bytes) => {
                                    tokens.push(truncated(&String::from_utf8_lossy(&bytes)));
                                    *response.body_mut() = Body::once(bytes);
                                }
                                Err(err) => {
                                    tokens.push(format!("Exception: {err}"));
                                    sink.info(&tokens.join(" "));
                                    return Err(err.into());
                                }
                            }
                        }
                    }

                    sink.info(&tokens.join(" "));
                    Ok(response)
                }
                Err(err) => {
                    tokens.push(format!("Exception: {err}"));
                    sink.info(&tokens.join(" "));
                    Err(err)
                }
            }
        })
    }
}

/// At most [`MAX_LOGGED_BODY`] characters, with a trailing `...` when cut.
fn truncated(text: &str) -> String {
    match text.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{truncated, MAX_LOGGED_BODY};

    #[test]
    fn short_body_logs_in_full() {
        let body = "x".repeat(900);
        assert_eq!(truncated(&body), body);
    }

    #[test]
    fn exact_limit_is_unmarked() {
        let body = "x".repeat(MAX_LOGGED_BODY);
        assert_eq!(truncated(&body), body);
    }

    #[test]
    fn long_body_is_cut_with_ellipsis() {
        let body = "x".repeat(1500);
        let logged = truncated(&body);
        assert_eq!(logged.len(), MAX_LOGGED_BODY + 3);
        assert!(logged.ends_with("..."));
        assert_eq!(&logged[..MAX_LOGGED_BODY], &body[..MAX_LOGGED_BODY]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(1200);
        let logged = truncated(&body);
        assert!(logged.ends_with("..."));
        assert_eq!(logged.chars().count(), MAX_LOGGED_BODY + 3);
    }
}

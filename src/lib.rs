//! # Wirelog
//!
//! Cross-cutting logging for RPC-style clients: decide per call whether an
//! invocation is eligible for logging and, if so, emit a single structured
//! log line with method identity, arguments, and result — without altering
//! call semantics and without breaking consumers of single-use response
//! bodies.
//!
//! ## Features
//!
//! - **Directive-driven eligibility**: environment allow-lists attached to
//!   methods or interface types, resolved through the type's capability set
//!   with a fixed precedence order
//! - **Invocation interception**: a dispatch table wrapped by a single
//!   interception point that logs eligible successful calls
//! - **HTTP exchange logging**: a tower layer decorating the underlying
//!   executor, with body truncation and re-buffering of single-use streams
//! - **Pluggable sinks**: every log line goes through a [`LogSink`], with a
//!   `tracing`-backed default
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::{json, Value};
//! use wirelog::{
//!     CapabilitySet, DispatchTable, EligibilityResolver, InterfaceCapability,
//!     InvocationDispatcher, LogDirective, MethodIdentity, StubTarget,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! // One method slot and its real handler, registered once per client.
//! let method = MethodIdentity::new("EchoService", "get_echo");
//! let table = DispatchTable::new().handle(method.clone(), |args: Vec<Value>| async move {
//!     // The real handler would perform the wire call here.
//!     Ok(json!({ "args": args }))
//! });
//!
//! // The stub's interfaces carry the logging directives.
//! let capabilities = CapabilitySet::new().with_interface(
//!     InterfaceCapability::new("EchoClient").directive(LogDirective::all()),
//! );
//!
//! let dispatcher = InvocationDispatcher::new(
//!     StubTarget::new("echo", "http://localhost:8080"),
//!     table,
//!     capabilities,
//!     EligibilityResolver::new("dev"),
//! );
//!
//! // Logs `EchoService.get_echo 1 hello ==> {"args":[1,"hello"]}` at info.
//! let result = dispatcher.invoke(&method, &[json!(1), json!("hello")]).await.unwrap();
//! assert_eq!(result, json!({ "args": [1, "hello"] }));
//! # }
//! ```
//!
//! ## HTTP exchange logging
//!
//! Handlers that speak HTTP can wrap their executor in [`HttpLogLayer`] to
//! get an independent log line per wire exchange:
//!
//! ```rust,no_run
//! use tower::ServiceBuilder;
//! use wirelog::{Body, HttpLogLayer};
//!
//! # let executor = tower::service_fn(|_req: http::Request<Body>| async {
//! #     Ok::<_, tower::BoxError>(http::Response::new(Body::empty()))
//! # });
//! let client = ServiceBuilder::new()
//!     .layer(HttpLogLayer::new(|_req| true))
//!     .service(executor);
//! ```
//!
//! ## Custom sinks
//!
//! Implement [`LogSink`] to route log lines somewhere other than `tracing`:
//!
//! ```rust
//! use wirelog::LogSink;
//!
//! struct StdoutSink;
//!
//! impl LogSink for StdoutSink {
//!     fn info(&self, line: &str) {
//!         println!("{line}");
//!     }
//! }
//! ```

pub mod content_type;
pub mod directive;
pub mod dispatch;
pub mod http_client;
pub mod sink;
pub mod types;

pub use directive::{
    CapabilitySet, EligibilityResolver, InterfaceCapability, LogDirective, MethodIdentity,
    TypeDirective,
};
pub use dispatch::{
    DispatchError, DispatchTable, InvocationDispatcher, MethodHandler, StubTarget,
};
pub use http_client::{HttpLogLayer, HttpLoggingClient};
pub use sink::{MultiSink, TracingSink};
pub use types::{Body, BodyError, BodyStream};

/// Destination for pre-formatted log lines.
///
/// Each record is a single line; [`LogSink::info`] receives the one record
/// emitted per eligible call or HTTP exchange, while [`LogSink::error`]
/// receives out-of-band failures of the logging machinery itself (a
/// rendering failure never masks the call's real result).
///
/// The default implementation of `error` forwards to `info`, so simple sinks
/// only need one method.
pub trait LogSink: Send + Sync + 'static {
    /// Emit one informational record.
    fn info(&self, line: &str);

    /// Report a failure of the logging machinery.
    fn error(&self, line: &str) {
        self.info(line);
    }
}

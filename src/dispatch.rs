//! Method dispatch with invocation logging.
//!
//! [`InvocationDispatcher`] is the client-side interception point: every
//! logical call on a stub goes through [`InvocationDispatcher::invoke`],
//! which routes it to the handler registered in the [`DispatchTable`] and,
//! for eligible methods, emits one log line describing the call. The table
//! is built once at client construction and shared read-only afterwards.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::directive::{CapabilitySet, EligibilityResolver, MethodIdentity};
use crate::sink::TracingSink;
use crate::LogSink;

/// Errors surfaced by [`InvocationDispatcher::invoke`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The dispatch table has no handler for the method.
    #[error("no handler registered for {0}")]
    UnknownMethod(MethodIdentity),
    /// The underlying remote call failed.
    #[error("remote call failed: {0}")]
    Transport(tower::BoxError),
    /// A handler failed to convert between JSON values and its own types.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl DispatchError {
    pub fn transport(err: impl Into<tower::BoxError>) -> Self {
        DispatchError::Transport(err.into())
    }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Type-erased async handler bound to one method slot.
pub type MethodHandler =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<Result<Value, DispatchError>> + Send + Sync>;

/// Mapping from method identity to its real handler.
///
/// Built once per client with the builder-style [`DispatchTable::handle`]
/// and never mutated afterwards, so concurrent calls can share it without
/// locking.
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<MethodIdentity, MethodHandler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a method slot. Returns self for chaining.
    pub fn handle<F, Fut>(mut self, method: MethodIdentity, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, DispatchError>> + Send + 'static,
    {
        self.handlers
            .insert(method, Arc::new(move |args| Box::pin(handler(args))));
        self
    }

    pub fn get(&self, method: &MethodIdentity) -> Option<&MethodHandler> {
        self.handlers.get(method)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("methods", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The logical remote target a stub points at.
///
/// Two stubs are considered equal iff their targets are equal; this is the
/// identity contract backing the dispatcher's `eq`/`hash`/`to_string`
/// handling.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StubTarget {
    pub service: String,
    pub url: String,
}

impl StubTarget {
    pub fn new(service: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for StubTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.service, self.url)
    }
}

/// Intercepts every call made through a stub's dispatch table.
///
/// Identity-style operations (method names `eq`, `hash`, and `to_string`)
/// are answered locally from the [`StubTarget`] and never reach the table or
/// the log. Every other method is forwarded to its registered handler;
/// failures propagate immediately and unlogged, and a successful return is
/// logged iff the [`EligibilityResolver`] says so.
///
/// # Examples
///
/// ```rust
/// use serde_json::{json, Value};
/// use wirelog::{
///     CapabilitySet, DispatchTable, EligibilityResolver, InterfaceCapability,
///     InvocationDispatcher, LogDirective, MethodIdentity, StubTarget,
/// };
///
/// # #[tokio::main]
/// # async fn main() {
/// let method = MethodIdentity::new("EchoService", "get_echo");
/// let table = DispatchTable::new().handle(method.clone(), |args: Vec<Value>| async move {
///     Ok(args.into_iter().next().unwrap_or(Value::Null))
/// });
/// let capabilities = CapabilitySet::new()
///     .with_interface(InterfaceCapability::new("EchoClient").directive(LogDirective::all()));
/// let dispatcher = InvocationDispatcher::new(
///     StubTarget::new("echo", "http://localhost:8080"),
///     table,
///     capabilities,
///     EligibilityResolver::new("dev"),
/// );
///
/// let result = dispatcher.invoke(&method, &[json!("hello")]).await.unwrap();
/// assert_eq!(result, json!("hello"));
/// # }
/// ```
pub struct InvocationDispatcher {
    target: StubTarget,
    dispatch: DispatchTable,
    capabilities: CapabilitySet,
    resolver: EligibilityResolver,
    sink: Arc<dyn LogSink>,
}

impl InvocationDispatcher {
    pub fn new(
        target: StubTarget,
        dispatch: DispatchTable,
        capabilities: CapabilitySet,
        resolver: EligibilityResolver,
    ) -> Self {
        Self {
            target,
            dispatch,
            capabilities,
            resolver,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the default `tracing` sink.
    pub fn with_sink(mut self, sink: impl LogSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn target(&self) -> &StubTarget {
        &self.target
    }

    /// Invoke `method` with `args` and return the handler's result.
    ///
    /// A handler failure is returned as-is; only a successful return is
    /// considered for logging. Eligible calls emit exactly one record of the
    /// form `"<declaringType>.<method> <args...> ==> <result>"`.
    pub async fn invoke(
        &self,
        method: &MethodIdentity,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        match method.name.as_str() {
            "eq" => return Ok(Value::Bool(self.target_matches(args.first()))),
            "hash" => return Ok(Value::from(self.identity_hash())),
            "to_string" => return Ok(Value::String(self.target.to_string())),
            _ => {}
        }

        let handler = self
            .dispatch
            .get(method)
            .ok_or_else(|| DispatchError::UnknownMethod(method.clone()))?;
        let result = handler(args.to_vec()).await?;
        self.log_invocation(method, args, &result);
        Ok(result)
    }

    /// Equality against a serialized [`StubTarget`]; anything that does not
    /// deserialize into one compares unequal rather than erroring.
    fn target_matches(&self, other: Option<&Value>) -> bool {
        match other {
            Some(value) => serde_json::from_value::<StubTarget>(value.clone())
                .map(|target| target == self.target)
                .unwrap_or(false),
            None => false,
        }
    }

    fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.target.hash(&mut hasher);
        hasher.finish()
    }

    fn log_invocation(&self, method: &MethodIdentity, args: &[Value], result: &Value) {
        if !self.resolver.resolve(method, &self.capabilities) {
            return;
        }
        // A rendering failure must not mask the successfully obtained result;
        // it is reported on the error channel instead.
        match render_line(method, args, result) {
            Ok(line) => self.sink.info(&line),
            Err(err) => self
                .sink
                .error(&format!("failed to render invocation log for {method}: {err}")),
        }
    }
}

impl fmt::Debug for InvocationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationDispatcher")
            .field("target", &self.target)
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

impl PartialEq for InvocationDispatcher {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for InvocationDispatcher {}

impl Hash for InvocationDispatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

impl fmt::Display for InvocationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.target.fmt(f)
    }
}

fn render_line(
    method: &MethodIdentity,
    args: &[Value],
    result: &Value,
) -> Result<String, serde_json::Error> {
    let mut tokens = Vec::with_capacity(args.len() + 3);
    tokens.push(method.qualified_name());
    for arg in args {
        tokens.push(render_argument(arg)?);
    }
    tokens.push("==>".to_string());
    tokens.push(serde_json::to_string(result)?);
    Ok(tokens.join(" "))
}

/// Scalars render in their natural form, strings unquoted; everything else
/// renders as JSON.
fn render_argument(arg: &Value) -> Result<String, serde_json::Error> {
    Ok(match arg {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other)?,
    })
}

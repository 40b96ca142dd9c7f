//! Log sink implementations.
//!
//! [`TracingSink`] is the default sink used throughout the crate. It emits
//! each pre-formatted line as a single `tracing` event at informational
//! severity, matching the one-line-per-record contract of the dispatcher and
//! the HTTP logging layer.

use std::sync::Arc;

use tracing::{error, info};

use crate::LogSink;

/// [`LogSink`] backed by the `tracing` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, line: &str) {
        info!(target: "wirelog", "{line}");
    }

    fn error(&self, line: &str) {
        error!(target: "wirelog", "{line}");
    }
}

/// A sink that fans each record out to several inner sinks.
///
/// Useful for emitting to `tracing` while also feeding a collector, e.g. in
/// tests or when shipping lines to a secondary destination.
///
/// # Examples
///
/// ```rust
/// use wirelog::{MultiSink, TracingSink};
///
/// let sink = MultiSink::new().with(TracingSink);
/// ```
#[derive(Clone, Default)]
pub struct MultiSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to the chain. Returns self for builder pattern.
    pub fn with<S: LogSink>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Returns true if no sinks have been added.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Returns the number of sinks in the chain.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl LogSink for MultiSink {
    fn info(&self, line: &str) {
        for sink in &self.sinks {
            sink.info(line);
        }
    }

    fn error(&self, line: &str) {
        for sink in &self.sinks {
            sink.error(line);
        }
    }
}

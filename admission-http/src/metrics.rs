//! An emit-only metrics collaborator applications can plug in to observe
//! admission outcomes, mirroring how [`admission_signature::DataManager`]
//! and [`admission_signature::Cache`] are supplied by the embedder rather
//! than built into the pipeline.

use std::time::Duration;

/// Every method defaults to a no-op so an application only overrides the
/// events it cares about.
pub trait MetricsSink: Send + Sync {
    fn admitted(&self, _path: &str, _verb: &str, _latency: Duration) {}
    fn rejected(&self, _path: &str, _verb: &str, _error_id: &str) {}
}

/// The default sink: observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {}

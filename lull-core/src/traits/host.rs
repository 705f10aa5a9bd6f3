//! The execution host a node runs inside.

use crate::cancel::CancellationSignal;
use crate::error::Result;
use crate::suspension::WaitUntil;
use crate::testing::providers::ClockProvider;
use crate::types::{NodeId, TraceId};
use crate::value::ParamValue;
use std::future::Future;
use std::pin::Pin;

/// A boxed future returned by host operations.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Services the workflow engine provides to a running node.
///
/// The engine owns persistence of paused executions and the webhook layer that
/// wakes them; a node only sees the operations below.
pub trait ExecutionHost: Send + Sync {
    /// The trace this execution belongs to.
    fn trace_id(&self) -> TraceId;

    /// The node being executed.
    fn node_id(&self) -> NodeId;

    /// Read one configuration parameter by name.
    ///
    /// The host performs no validation; `None` means the parameter is unset.
    fn node_parameter(&self, name: &str) -> Option<ParamValue>;

    /// The configured timezone name (e.g. `Europe/Berlin`), used to interpret
    /// date/time values that carry no offset.
    fn timezone(&self) -> String;

    /// The clock used for "now".
    fn clock(&self) -> &dyn ClockProvider;

    /// Pause the current execution until `until` is satisfied.
    ///
    /// The future resolves when the host resumes the execution. A deadline in
    /// the past resumes immediately.
    fn put_execution_to_wait(&self, until: WaitUntil) -> HostFuture<'_, ()>;

    /// The one-shot signal fired when the host cancels this execution.
    fn cancellation(&self) -> CancellationSignal;
}

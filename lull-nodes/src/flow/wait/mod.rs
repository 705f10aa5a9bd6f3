//! Wait node.
//!
//! Pauses the running execution until a point in time, for a relative
//! interval, or until something outside the workflow wakes it. A cancellation
//! of the execution interrupts the pause.

pub mod coordinator;
mod datetime;
pub mod policy;
pub mod resolver;

pub use datetime::{normalize_date_time, parse_timezone};
pub use policy::{ResumeMode, ResumePolicy, TimeUnit, UnknownChoice};
pub use resolver::{Resolver, resolve};

use chrono::{DateTime, Utc};
use lull_core::error::{LullError, Result, ResultExt};
use lull_core::suspension::SuspensionOutcome;
use lull_core::traits::{ExecutionHost, Node, NodeFactory, NodeFuture, NodeInfo};
use lull_core::types::NodeId;
use lull_core::value::NodeParameters;
use std::num::NonZeroU32;

/// Wait node.
///
/// Resolves its resume policy, hands the wait to the host, and returns once
/// the host resumes the execution. Returns [`LullError::Canceled`] if the
/// execution is canceled first.
///
/// Parameters come from the host; any the host leaves unset fall back to the
/// node's own defaults (its YAML `config:` block).
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   cool_down:
///     type: std::wait
///     config:
///       resume: timeInterval
///       amount: 15
///       unit: minutes
///
///   await_callback:
///     type: std::wait
///     config:
///       resume: webhook
///       limitWait: true
///       limitType: afterTimeInterval
///       resumeAmount: 2
///       resumeUnit: days
/// ```
#[derive(Debug, Clone, Default)]
pub struct WaitNode {
    defaults: NodeParameters,
}

impl WaitNode {
    /// Create a wait node that reads everything from the host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a wait node with default parameters.
    pub fn with_defaults(defaults: NodeParameters) -> Self {
        Self { defaults }
    }

    /// Wait for a relative interval.
    pub fn after(amount: NonZeroU32, unit: TimeUnit) -> Self {
        Self::with_defaults(
            NodeParameters::new()
                .with(resolver::params::RESUME, "timeInterval")
                .with(resolver::params::AMOUNT, i64::from(amount.get()))
                .with(resolver::params::UNIT, unit.as_str()),
        )
    }

    /// Wait until an absolute instant.
    pub fn until(at: DateTime<Utc>) -> Self {
        Self::with_defaults(
            NodeParameters::new()
                .with(resolver::params::RESUME, "specificTime")
                .with(resolver::params::DATE_TIME, at),
        )
    }

    /// Wait for an external wake.
    pub fn webhook() -> Self {
        Self::with_defaults(NodeParameters::new().with(resolver::params::RESUME, "webhook"))
    }

    /// The default parameters.
    pub fn defaults(&self) -> &NodeParameters {
        &self.defaults
    }

    /// Resolve, suspend, and report how the wait ended.
    async fn run(&self, host: &dyn ExecutionHost) -> Result<()> {
        let trace_id = host.trace_id();
        let node_id = host.node_id();

        let policy = Resolver::new(host)
            .with_defaults(&self.defaults)
            .resolve()
            .inspect_err(|e| {
                tracing::warn!(%trace_id, %node_id, error = %e, "Wait: invalid configuration");
            })?;

        tracing::info!(
            %trace_id,
            %node_id,
            policy = policy.kind(),
            until = %policy.wait_until(),
            "Wait: pausing execution"
        );

        match coordinator::suspend(host, &policy).await? {
            SuspensionOutcome::Resumed => {
                tracing::info!(%trace_id, %node_id, "Wait: resumed");
                Ok(())
            }
            SuspensionOutcome::Canceled => {
                tracing::warn!(%trace_id, %node_id, "Wait: canceled while waiting");
                Err(LullError::Canceled { trace_id, node_id })
            }
        }
    }
}

impl Node for WaitNode {
    fn info(&self) -> NodeInfo {
        NodeInfo::new("std", "wait")
            .with_description("Pause execution until a time, an interval, or an external wake")
            .effectful()
    }

    fn execute<'a>(&'a self, host: &'a dyn ExecutionHost) -> NodeFuture<'a> {
        Box::pin(self.run(host))
    }
}

/// Factory for [`WaitNode`]s configured from YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitNodeFactory;

impl WaitNodeFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

impl NodeFactory for WaitNodeFactory {
    fn node_type(&self) -> &str {
        "std::wait"
    }

    fn create(&self, config: &serde_yaml::Value) -> Result<Box<dyn Node>> {
        let defaults = NodeParameters::from_yaml(config).with_node(NodeId::default())?;

        // The mode never depends on runtime state, so a bad one is caught here.
        if let Some(mode) = defaults.get(resolver::params::RESUME) {
            mode.as_str()
                .unwrap_or_default()
                .parse::<ResumeMode>()
                .map_err(|e| LullError::ConfigValue {
                    field: resolver::params::RESUME.to_string(),
                    cause: format!("{e}, got {mode}"),
                })?;
        }

        tracing::debug!(parameters = defaults.len(), "Created wait node");
        Ok(Box::new(WaitNode::with_defaults(defaults)))
    }
}

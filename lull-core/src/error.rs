//! Error types for lull.
//!
//! Every error carries a stable code (`E####`) in its message so hosts can
//! tell a misconfigured wait from a canceled one without string matching.

use crate::types::{NodeId, TraceId};
use thiserror::Error;

/// The main error type for lull operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LullError {
    // =========================================================================
    // Node Errors (E300-E399)
    // =========================================================================
    /// Invalid node configuration.
    #[error("E304: Invalid configuration for node {node_id}: {cause}")]
    NodeConfig {
        /// The node with invalid configuration.
        node_id: NodeId,
        /// Description of the configuration error.
        cause: String,
    },

    // =========================================================================
    // Configuration Errors (E800-E899)
    // =========================================================================
    /// Invalid configuration document.
    #[error("E802: Invalid configuration '{field}': {cause}")]
    ConfigValue {
        /// The configuration field that is invalid.
        field: String,
        /// Description of why the value is invalid.
        cause: String,
    },

    /// Serialization error.
    #[error("E804: Serialization error: {0}")]
    Serialization(String),

    // =========================================================================
    // Suspension Errors (E1100-E1199)
    // =========================================================================
    /// The host failed to suspend the execution.
    #[error("E1102: Suspension failed for trace {trace_id}: {cause}")]
    SuspensionFailed {
        /// The trace being suspended.
        trace_id: TraceId,
        /// Reason reported by the host.
        cause: String,
    },

    /// The execution was canceled before its resume condition was met.
    #[error("E1103: Execution of {node_id} in trace {trace_id} was canceled while waiting")]
    Canceled {
        /// The trace that was canceled.
        trace_id: TraceId,
        /// The node that was waiting.
        node_id: NodeId,
    },

    /// A wait parameter could not be turned into a resume policy.
    #[error("E1104: Invalid value {value} for parameter '{parameter}': {cause}")]
    InvalidParameter {
        /// The parameter name (e.g. `dateTime`).
        parameter: String,
        /// The offending raw value, rendered for humans.
        value: String,
        /// Why the value was rejected.
        cause: String,
    },
}

impl LullError {
    /// Build an [`LullError::InvalidParameter`] from any displayable raw value.
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl std::fmt::Display,
        cause: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
            cause: cause.into(),
        }
    }

    /// Get the error code (e.g., "E1103").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NodeConfig { .. } => "E304",
            Self::ConfigValue { .. } => "E802",
            Self::Serialization(_) => "E804",
            Self::SuspensionFailed { .. } => "E1102",
            Self::Canceled { .. } => "E1103",
            Self::InvalidParameter { .. } => "E1104",
        }
    }

    /// Check if this error is retriable.
    ///
    /// Only host-side suspension failures qualify. A bad date stays bad and a
    /// cancellation is final.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::SuspensionFailed { .. })
    }

    /// Check if this error is a configuration/validation error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::NodeConfig { .. } | Self::ConfigValue { .. } | Self::InvalidParameter { .. }
        )
    }

    /// Check if this error reports a cancellation.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

/// Result type alias using `LullError`.
pub type Result<T> = std::result::Result<T, LullError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Attach node context to an error.
    fn with_node(self, node_id: NodeId) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn with_node(self, node_id: NodeId) -> Result<T> {
        self.map_err(|e| LullError::NodeConfig {
            node_id,
            cause: e.to_string(),
        })
    }
}

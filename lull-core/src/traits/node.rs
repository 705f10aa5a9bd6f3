//! Node trait and related types.

use super::host::ExecutionHost;
use crate::error::Result;
use std::future::Future;
use std::pin::Pin;

/// Metadata about a node type.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    /// Fully qualified name (e.g., "std::wait").
    pub name: String,
    /// Namespace (e.g., "std").
    pub namespace: String,
    /// Short name (e.g., "wait").
    pub short_name: String,
    /// Description of what the node does.
    pub description: String,
    /// Version of the node implementation.
    pub version: String,
    /// Whether this node has side effects on the host.
    pub effectful: bool,
}

impl NodeInfo {
    /// Create new node info.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let short_name = name.into();
        let full_name = format!("{}::{}", namespace, short_name);

        Self {
            name: full_name,
            namespace,
            short_name,
            description: String::new(),
            version: "1.0.0".to_string(),
            effectful: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Mark as effectful (has side effects).
    pub fn effectful(mut self) -> Self {
        self.effectful = true;
        self
    }
}

/// A boxed future for async node execution.
pub type NodeFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A unit of work executed inside a host.
///
/// `Ok(())` means the node finished and the execution may continue; any error
/// is reported to the host as a failed operation.
pub trait Node: Send + Sync {
    /// Get metadata about this node.
    fn info(&self) -> NodeInfo;

    /// Execute the node against the given host.
    fn execute<'a>(&'a self, host: &'a dyn ExecutionHost) -> NodeFuture<'a>;
}

/// A node factory that creates node instances from configuration.
pub trait NodeFactory: Send + Sync {
    /// Get the node type name this factory creates.
    fn node_type(&self) -> &str;

    /// Create a new node instance from YAML configuration.
    fn create(&self, config: &serde_yaml::Value) -> Result<Box<dyn Node>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_info_creation() {
        let info = NodeInfo::new("std", "wait")
            .with_description("Pause execution")
            .with_version("2.0.0")
            .effectful();

        assert_eq!(info.name, "std::wait");
        assert_eq!(info.namespace, "std");
        assert_eq!(info.short_name, "wait");
        assert_eq!(info.version, "2.0.0");
        assert!(info.effectful);
    }
}

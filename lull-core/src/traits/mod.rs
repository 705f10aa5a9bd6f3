//! Core traits: the host a node runs inside, and the node itself.

mod host;
mod node;

pub use host::{ExecutionHost, HostFuture};
pub use node::{Node, NodeFactory, NodeFuture, NodeInfo};

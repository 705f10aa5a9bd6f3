//! Core identifier types.
//!
//! - `TraceId`: identifier for a single workflow execution
//! - `NodeId`: identifier for a node within a flow

mod ids;

pub use ids::{NodeId, TraceId};

//! lull core library
//!
//! Foundational types and traits for suspending a running workflow execution
//! and resuming it later, or aborting the pause when the execution is canceled.
//!
//! # Key Components
//!
//! - **Host**: [`ExecutionHost`], the services a workflow engine gives a node
//! - **Suspension**: [`WaitUntil`] and [`SuspensionOutcome`]
//! - **Cancellation**: [`CancellationSignal`], a shared one-shot event
//! - **Values**: [`ParamValue`] and [`NodeParameters`] for node configuration
//! - **Testing**: a [`testing::TestHost`] with a mock clock and event recorder

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod error;
pub mod observability;
pub mod suspension;
// Testing module must be declared before traits because the host trait uses the clock provider
pub mod testing;
pub mod traits;
pub mod types;
pub mod value;

pub use cancel::CancellationSignal;
pub use error::{LullError, Result, ResultExt};
pub use suspension::{SuspensionOutcome, WaitUntil};
pub use traits::{ExecutionHost, HostFuture, Node, NodeFactory, NodeFuture, NodeInfo};
pub use types::{NodeId, TraceId};
pub use value::{NodeParameters, ParamValue};

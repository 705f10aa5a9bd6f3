//! Standard nodes for lull.
//!
//! ## Flow Control (`flow::*`)
//! - [`flow::WaitNode`] - Pause an execution until a time, an interval, or an
//!   external wake, aborting the pause if the execution is canceled
//!
//! The wait node is built from two pieces that can also be used on their own:
//! [`flow::wait::resolver`] turns parameters into a [`flow::ResumePolicy`], and
//! [`flow::wait::coordinator::suspend`] races the host's pause against
//! cancellation.

#![warn(missing_docs)]

pub mod flow;

pub use flow::{ResumeMode, ResumePolicy, TimeUnit, WaitNode, WaitNodeFactory};

/// Prelude for commonly used types.
pub mod prelude {
    pub use crate::flow::wait::coordinator::suspend;
    pub use crate::flow::wait::resolver::{Resolver, resolve};
    pub use crate::flow::{ResumePolicy, TimeUnit, WaitNode, WaitNodeFactory};
}

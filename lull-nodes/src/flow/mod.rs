//! Flow control nodes.

pub mod wait;

pub use wait::{ResumeMode, ResumePolicy, TimeUnit, WaitNode, WaitNodeFactory};

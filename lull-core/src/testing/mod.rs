//! Deterministic testing framework.
//!
//! Provides a [`TestHost`] that stands in for the workflow engine, with a
//! controllable clock and a recorder of every host interaction.
//!
//! # Example
//!
//! ```ignore
//! use lull_core::testing::{TestHostBuilder, WaitBehavior};
//!
//! #[tokio::test]
//! async fn waits_until_noon() {
//!     let host = TestHostBuilder::new()
//!         .with_fixed_time("2024-06-01T11:00:00Z")
//!         .with_parameter("resume", "specificTime")
//!         .with_parameter("dateTime", "2024-06-01T12:00:00")
//!         .with_wait_behavior(WaitBehavior::FollowClock)
//!         .build();
//!
//!     // Execute a node against `host`, then assert on
//!     // `host.recorder().wait_requests()`.
//! }
//! ```

pub mod host;
pub mod providers;
pub mod recording;

pub use host::{TestHost, TestHostBuilder, WaitBehavior, WakeHandle};
pub use providers::{ClockProvider, MockClock, RealClock, SleepFuture};
pub use recording::{EventRecorder, RecordedEvent};

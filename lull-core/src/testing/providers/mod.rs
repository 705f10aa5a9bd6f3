//! Provider traits and implementations for the testing framework.
//!
//! Each provider abstracts an external dependency, allowing tests to inject
//! mock implementations while production code uses real implementations.

mod clock;

pub use clock::{ClockProvider, MockClock, RealClock, SleepFuture};

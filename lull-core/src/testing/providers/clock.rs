//! Clock provider for time abstraction.
//!
//! Allows tests to use a mock clock with controllable time, while production
//! code uses the real system clock.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

/// A boxed sleep future borrowed from a clock.
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Provider trait for time operations.
///
/// Interval waits read the current time from here, and hosts that resume on
/// their own sleep through it, so tests can control both precisely.
pub trait ClockProvider: Send + Sync {
    /// Get the current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Sleep until the given instant.
    ///
    /// Completes immediately when the instant is not in the future.
    fn sleep_until(&self, deadline: DateTime<Utc>) -> SleepFuture<'_>;

    /// Advance time by the specified duration (mock-only operation).
    ///
    /// Real implementations should do nothing.
    fn advance(&self, duration: Duration);

    /// Check if this is a mock clock.
    fn is_mock(&self) -> bool;
}

/// Real clock that uses system time.
#[derive(Debug, Clone, Default)]
pub struct RealClock;

impl RealClock {
    /// Create a new real clock.
    pub fn new() -> Self {
        Self
    }
}

impl ClockProvider for RealClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep_until(&self, deadline: DateTime<Utc>) -> SleepFuture<'_> {
        let remaining = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        Box::pin(tokio::time::sleep(remaining))
    }

    fn advance(&self, _duration: Duration) {
        // Real clock cannot be manually advanced
    }

    fn is_mock(&self) -> bool {
        false
    }
}

/// Mock clock for testing with controllable time.
///
/// The mock clock starts at a fixed time and only advances when explicitly
/// told to via `advance()`. Pending sleeps are woken as time passes them.
pub struct MockClock {
    /// Wall-clock time in milliseconds since UNIX epoch.
    now_millis: AtomicI64,
    /// Pending sleeps that should be woken when time is advanced.
    pending_sleeps: Mutex<Vec<PendingSleep>>,
    next_sleep_id: AtomicU64,
}

struct PendingSleep {
    id: u64,
    wake_at_millis: i64,
    waker: Waker,
}

impl MockClock {
    /// Create a mock clock starting at the UNIX epoch.
    pub fn new() -> Self {
        Self::at(DateTime::<Utc>::default())
    }

    /// Create a mock clock starting at the given instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now_millis: AtomicI64::new(now.timestamp_millis()),
            pending_sleeps: Mutex::new(Vec::new()),
            next_sleep_id: AtomicU64::new(0),
        }
    }

    /// Create a mock clock fixed at the specified RFC 3339 time.
    ///
    /// # Panics
    ///
    /// Panics if `iso_time` is not valid RFC 3339.
    ///
    /// # Example
    ///
    /// ```
    /// use lull_core::testing::{ClockProvider, MockClock};
    ///
    /// let clock = MockClock::fixed("2024-01-15T10:30:00Z");
    /// assert_eq!(clock.now().timestamp_millis(), 1_705_314_600_000);
    /// ```
    pub fn fixed(iso_time: &str) -> Self {
        let dt = DateTime::parse_from_rfc3339(iso_time).expect("Invalid RFC 3339 datetime format");
        Self::at(dt.with_timezone(&Utc))
    }

    /// Number of sleeps currently waiting on this clock.
    pub fn pending_sleeps(&self) -> usize {
        self.pending_sleeps.lock().len()
    }

    fn now_millis(&self) -> i64 {
        self.now_millis.load(Ordering::SeqCst)
    }

    /// Wake any pending sleeps whose deadline has passed.
    fn wake_expired_sleeps(&self, current: i64) {
        let mut sleeps = self.pending_sleeps.lock();
        sleeps.retain(|sleep| {
            if sleep.wake_at_millis <= current {
                sleep.waker.wake_by_ref();
                false
            } else {
                true
            }
        });
    }

    /// Check the deadline and, if it has not passed, register `waker`.
    ///
    /// Both happen under the sleep lock. `advance` bumps the time before it
    /// takes that lock, so it either is visible here or finds the registration.
    fn poll_sleep(&self, slot: &mut Option<u64>, wake_at_millis: i64, waker: &Waker) -> bool {
        let mut sleeps = self.pending_sleeps.lock();
        if self.now_millis() >= wake_at_millis {
            if let Some(id) = slot.take() {
                sleeps.retain(|s| s.id != id);
            }
            return true;
        }

        match slot {
            Some(id) => {
                if let Some(sleep) = sleeps.iter_mut().find(|s| s.id == *id) {
                    sleep.waker.clone_from(waker);
                    return false;
                }
                // Woken spuriously and already removed; register again.
                sleeps.push(PendingSleep {
                    id: *id,
                    wake_at_millis,
                    waker: waker.clone(),
                });
            }
            None => {
                let id = self.next_sleep_id.fetch_add(1, Ordering::SeqCst);
                sleeps.push(PendingSleep {
                    id,
                    wake_at_millis,
                    waker: waker.clone(),
                });
                *slot = Some(id);
            }
        }
        false
    }

    fn deregister(&self, id: u64) {
        self.pending_sleeps.lock().retain(|s| s.id != id);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockProvider for MockClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }

    fn sleep_until(&self, deadline: DateTime<Utc>) -> SleepFuture<'_> {
        Box::pin(MockSleep {
            clock: self,
            wake_at_millis: deadline.timestamp_millis(),
            slot: None,
        })
    }

    fn advance(&self, duration: Duration) {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        let new_time = self.now_millis.fetch_add(millis, Ordering::SeqCst) + millis;
        self.wake_expired_sleeps(new_time);
    }

    fn is_mock(&self) -> bool {
        true
    }
}

/// Future returned by `MockClock::sleep_until()`.
struct MockSleep<'a> {
    clock: &'a MockClock,
    wake_at_millis: i64,
    slot: Option<u64>,
}

impl Future for MockSleep<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this
            .clock
            .poll_sleep(&mut this.slot, this.wake_at_millis, cx.waker())
        {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl Drop for MockSleep<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.slot.take() {
            self.clock.deregister(id);
        }
    }
}

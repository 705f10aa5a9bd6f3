//! Test host and builder for deterministic testing.
//!
//! [`TestHost`] implements [`ExecutionHost`] with configurable parameters, a
//! pluggable clock, scripted wait behaviour and an event recorder.

use super::providers::{ClockProvider, MockClock, RealClock};
use super::recording::{EventRecorder, RecordedEvent};
use crate::cancel::CancellationSignal;
use crate::error::LullError;
use crate::suspension::WaitUntil;
use crate::traits::{ExecutionHost, HostFuture};
use crate::types::{NodeId, TraceId};
use crate::value::{NodeParameters, ParamValue};
use std::sync::Arc;
use tokio::sync::Notify;

/// How the test host answers `put_execution_to_wait`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WaitBehavior {
    /// Resume as soon as the wait is requested.
    #[default]
    ResumeImmediately,
    /// Sleep on the host clock until the deadline; external waits also end on
    /// a wake.
    FollowClock,
    /// Never resume on its own; only a wake ends the wait.
    Hold,
    /// Report a host failure with the given cause.
    Fail(String),
}

/// Handle used to wake an execution waiting on a [`TestHost`].
#[derive(Debug, Clone, Default)]
pub struct WakeHandle {
    notify: Arc<Notify>,
}

impl WakeHandle {
    /// Wake the waiting execution.
    ///
    /// A wake sent before anyone waits is kept and consumed by the next wait.
    pub fn wake(&self) {
        self.notify.notify_one();
    }
}

/// An [`ExecutionHost`] for tests.
///
/// # Example
///
/// ```
/// use lull_core::testing::{TestHostBuilder, WaitBehavior};
///
/// let host = TestHostBuilder::new()
///     .with_fixed_time("2024-06-01T12:00:00Z")
///     .with_parameter("resume", "timeInterval")
///     .with_parameter("amount", 60)
///     .with_parameter("unit", "seconds")
///     .with_wait_behavior(WaitBehavior::Hold)
///     .build();
///
/// assert!(host.recorder().is_empty());
/// ```
pub struct TestHost {
    trace_id: TraceId,
    node_id: NodeId,
    parameters: NodeParameters,
    timezone: String,
    clock: Arc<dyn ClockProvider>,
    behavior: WaitBehavior,
    cancellation: CancellationSignal,
    wake: WakeHandle,
    recorder: Arc<EventRecorder>,
}

impl TestHost {
    /// Get the event recorder.
    pub fn recorder(&self) -> &Arc<EventRecorder> {
        &self.recorder
    }

    /// Get a clone of the cancellation signal, for firing it from a test.
    pub fn cancel_handle(&self) -> CancellationSignal {
        self.cancellation.clone()
    }

    /// Get a handle that wakes a waiting execution.
    pub fn wake_handle(&self) -> WakeHandle {
        self.wake.clone()
    }

    /// Get a shared handle to the host clock.
    pub fn clock_handle(&self) -> Arc<dyn ClockProvider> {
        Arc::clone(&self.clock)
    }

    /// Fire the cancellation signal.
    pub fn cancel(&self) -> bool {
        self.cancellation.fire()
    }

    /// Wake a waiting execution.
    pub fn wake(&self) {
        self.wake.wake();
    }

    async fn hold_until(&self, until: WaitUntil) -> bool {
        match (&self.behavior, until.deadline()) {
            (WaitBehavior::FollowClock, Some(deadline)) if until.accepts_wake() => {
                tokio::select! {
                    _ = self.clock.sleep_until(deadline) => false,
                    _ = self.wake.notify.notified() => true,
                }
            }
            (WaitBehavior::FollowClock, Some(deadline)) => {
                self.clock.sleep_until(deadline).await;
                false
            }
            _ => {
                self.wake.notify.notified().await;
                true
            }
        }
    }
}

impl ExecutionHost for TestHost {
    fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn node_parameter(&self, name: &str) -> Option<ParamValue> {
        let value = self.parameters.get(name).cloned();
        self.recorder.record(RecordedEvent::ParameterRead {
            name: name.to_string(),
            found: value.is_some(),
        });
        value
    }

    fn timezone(&self) -> String {
        self.recorder.record(RecordedEvent::TimezoneRead {
            timezone: self.timezone.clone(),
        });
        self.timezone.clone()
    }

    fn clock(&self) -> &dyn ClockProvider {
        &*self.clock
    }

    fn put_execution_to_wait(&self, until: WaitUntil) -> HostFuture<'_, ()> {
        tracing::debug!(trace_id = %self.trace_id, %until, behavior = ?self.behavior, "Test host: wait requested");
        self.recorder.record(RecordedEvent::WaitRequested { until });

        Box::pin(async move {
            let woken = match &self.behavior {
                WaitBehavior::ResumeImmediately => false,
                WaitBehavior::Fail(cause) => {
                    return Err(LullError::SuspensionFailed {
                        trace_id: self.trace_id,
                        cause: cause.clone(),
                    });
                }
                WaitBehavior::FollowClock | WaitBehavior::Hold => self.hold_until(until).await,
            };
            tracing::debug!(trace_id = %self.trace_id, woken, "Test host: wait resumed");
            self.recorder.record(RecordedEvent::WaitResumed { woken });
            Ok(())
        })
    }

    fn cancellation(&self) -> CancellationSignal {
        self.recorder.record(RecordedEvent::CancellationRequested);
        self.cancellation.clone()
    }
}

/// Builder for creating test hosts.
pub struct TestHostBuilder {
    trace_id: Option<TraceId>,
    node_id: Option<NodeId>,
    parameters: NodeParameters,
    timezone: String,
    clock: Option<Arc<dyn ClockProvider>>,
    behavior: WaitBehavior,
    cancellation: Option<CancellationSignal>,
    recorder: Option<Arc<EventRecorder>>,
}

impl TestHostBuilder {
    /// Create a new test host builder with default settings.
    ///
    /// Defaults: timezone `UTC`, the real clock, and waits that resume at once.
    pub fn new() -> Self {
        Self {
            trace_id: None,
            node_id: None,
            parameters: NodeParameters::new(),
            timezone: "UTC".to_string(),
            clock: None,
            behavior: WaitBehavior::default(),
            cancellation: None,
            recorder: None,
        }
    }

    /// Set the trace ID.
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Set the node ID.
    pub fn with_node_id(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Set one node parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    /// Set several node parameters at once.
    pub fn with_parameters(mut self, parameters: &NodeParameters) -> Self {
        self.parameters.overlay(parameters);
        self
    }

    /// Set the configured timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    // Clock providers

    /// Use a mock clock fixed at the given RFC 3339 time.
    pub fn with_fixed_time(mut self, iso_time: &str) -> Self {
        self.clock = Some(Arc::new(MockClock::fixed(iso_time)));
        self
    }

    /// Use a custom clock provider.
    pub fn with_clock(mut self, clock: Arc<dyn ClockProvider>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use the real system clock.
    pub fn with_real_clock(mut self) -> Self {
        self.clock = Some(Arc::new(RealClock::new()));
        self
    }

    /// Choose how waits are answered.
    pub fn with_wait_behavior(mut self, behavior: WaitBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Share an existing cancellation signal.
    pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancellation = Some(signal);
        self
    }

    /// Share an existing event recorder.
    pub fn with_recorder(mut self, recorder: Arc<EventRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Build the test host.
    pub fn build(self) -> TestHost {
        TestHost {
            trace_id: self.trace_id.unwrap_or_default(),
            node_id: self.node_id.unwrap_or_default(),
            parameters: self.parameters,
            timezone: self.timezone,
            clock: self.clock.unwrap_or_else(|| Arc::new(RealClock::new())),
            behavior: self.behavior,
            cancellation: self.cancellation.unwrap_or_default(),
            wake: WakeHandle::default(),
            recorder: self.recorder.unwrap_or_default(),
        }
    }
}

impl Default for TestHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::time::Duration;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn parameters_and_timezone_are_recorded() {
        let host = TestHostBuilder::new()
            .with_parameter("resume", "webhook")
            .with_timezone("Europe/Berlin")
            .build();

        assert_eq!(
            host.node_parameter("resume"),
            Some(ParamValue::string("webhook"))
        );
        assert_eq!(host.node_parameter("missing"), None);
        assert_eq!(host.timezone(), "Europe/Berlin");

        let events = host.recorder().events();
        assert_eq!(
            events[1],
            RecordedEvent::ParameterRead {
                name: "missing".to_string(),
                found: false
            }
        );
        assert_eq!(host.recorder().count_of("timezone_read"), 1);
    }

    #[tokio::test]
    async fn resume_immediately_records_request() {
        let host = TestHostBuilder::new().build();
        let until = WaitUntil::at(instant("2024-06-02T00:00:00Z"));

        host.put_execution_to_wait(until).await.unwrap();

        assert_eq!(host.recorder().wait_requests(), vec![until]);
        assert_eq!(host.recorder().count_of("wait_resumed"), 1);
    }

    #[tokio::test]
    async fn follow_clock_resumes_when_time_passes() {
        let host = Arc::new(
            TestHostBuilder::new()
                .with_fixed_time("2024-06-01T00:00:00Z")
                .with_wait_behavior(WaitBehavior::FollowClock)
                .build(),
        );
        let until = WaitUntil::at(instant("2024-06-01T00:01:00Z"));

        let waiting = Arc::clone(&host);
        let task = tokio::spawn(async move { waiting.put_execution_to_wait(until).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        host.clock_handle().advance(Duration::from_secs(61));
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("wait did not resume")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn follow_clock_external_wait_ends_on_wake() {
        let host = Arc::new(
            TestHostBuilder::new()
                .with_fixed_time("2024-06-01T00:00:00Z")
                .with_wait_behavior(WaitBehavior::FollowClock)
                .build(),
        );

        let waiting = Arc::clone(&host);
        let task =
            tokio::spawn(async move { waiting.put_execution_to_wait(WaitUntil::external()).await });

        host.wake();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("wake did not resume")
            .unwrap()
            .unwrap();
        assert_eq!(
            host.recorder().events().last(),
            Some(&RecordedEvent::WaitResumed { woken: true })
        );
    }

    #[tokio::test]
    async fn fail_behavior_reports_host_failure() {
        let host = TestHostBuilder::new()
            .with_wait_behavior(WaitBehavior::Fail("store offline".to_string()))
            .build();

        let err = host
            .put_execution_to_wait(WaitUntil::external())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E1102");
        assert!(err.to_string().contains("store offline"));
    }

    #[test]
    fn cancel_fires_shared_signal() {
        let host = TestHostBuilder::new().build();
        let signal = host.cancellation();
        assert!(host.cancel());
        assert!(signal.is_fired());
        assert!(!host.cancel());
    }
}

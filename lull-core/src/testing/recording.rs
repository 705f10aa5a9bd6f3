//! Event recording for test assertions.
//!
//! Records every interaction between a node and its host so tests can assert
//! on what was asked of the host, and in which order.

use crate::suspension::WaitUntil;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// An event recorded during test execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedEvent {
    /// A node parameter was read.
    ParameterRead {
        /// Parameter name.
        name: String,
        /// Whether the parameter was set.
        found: bool,
    },

    /// The configured timezone was read.
    TimezoneRead {
        /// The timezone returned.
        timezone: String,
    },

    /// The node asked the host to pause the execution.
    WaitRequested {
        /// What the host was asked to wait for.
        until: WaitUntil,
    },

    /// The host resumed the execution.
    WaitResumed {
        /// Whether an external wake ended the wait.
        woken: bool,
    },

    /// The node took the cancellation signal.
    CancellationRequested,

    /// Custom event for application-specific recording.
    Custom {
        /// Event name.
        name: String,
        /// Event data as JSON.
        data: serde_json::Value,
    },
}

impl RecordedEvent {
    /// Create a custom event.
    pub fn custom(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self::Custom {
            name: name.into(),
            data,
        }
    }

    /// Get the event type as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ParameterRead { .. } => "parameter_read",
            Self::TimezoneRead { .. } => "timezone_read",
            Self::WaitRequested { .. } => "wait_requested",
            Self::WaitResumed { .. } => "wait_resumed",
            Self::CancellationRequested => "cancellation_requested",
            Self::Custom { .. } => "custom",
        }
    }
}

/// Recorder for capturing events during test execution.
///
/// Thread-safe and can be shared across async tasks.
///
/// # Example
///
/// ```
/// use lull_core::testing::{EventRecorder, RecordedEvent};
///
/// let recorder = EventRecorder::new();
/// recorder.record(RecordedEvent::TimezoneRead { timezone: "UTC".to_string() });
///
/// assert_eq!(recorder.len(), 1);
/// assert!(recorder.to_json().contains("timezone_read"));
/// ```
pub struct EventRecorder {
    events: RwLock<Vec<RecordedEvent>>,
    enabled: AtomicBool,
}

impl EventRecorder {
    /// Create a new event recorder.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Record an event.
    pub fn record(&self, event: RecordedEvent) {
        if self.enabled.load(Ordering::SeqCst) {
            self.events.write().push(event);
        }
    }

    /// Get all recorded events.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().clone()
    }

    /// Get the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Check if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Enable or disable recording.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Every wait the host was asked to perform, in order.
    pub fn wait_requests(&self) -> Vec<WaitUntil> {
        self.events
            .read()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::WaitRequested { until } => Some(*until),
                _ => None,
            })
            .collect()
    }

    /// Count events of a given type.
    pub fn count_of(&self, event_type: &str) -> usize {
        self.events
            .read()
            .iter()
            .filter(|event| event.event_type() == event_type)
            .count()
    }

    /// Convert recorded events to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&*self.events.read()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn records_in_order() {
        let recorder = EventRecorder::new();
        recorder.record(RecordedEvent::ParameterRead {
            name: "resume".to_string(),
            found: true,
        });
        recorder.record(RecordedEvent::CancellationRequested);

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "parameter_read");
        assert_eq!(events[1].event_type(), "cancellation_requested");
    }

    #[test]
    fn disabled_recorder_drops_events() {
        let recorder = EventRecorder::new();
        recorder.set_enabled(false);
        recorder.record(RecordedEvent::CancellationRequested);
        assert!(recorder.is_empty());
    }

    #[test]
    fn wait_requests_are_extracted() {
        let at = DateTime::parse_from_rfc3339("2024-06-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let recorder = EventRecorder::new();
        recorder.record(RecordedEvent::WaitRequested {
            until: WaitUntil::at(at),
        });
        recorder.record(RecordedEvent::WaitResumed { woken: false });

        assert_eq!(recorder.wait_requests(), vec![WaitUntil::at(at)]);
        assert_eq!(recorder.count_of("wait_resumed"), 1);
    }
}

//! Core suspension types.
//!
//! These describe what a waiting node hands to the host (`WaitUntil`) and how
//! the wait ended (`SuspensionOutcome`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the host should wait for before resuming the execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitUntil {
    /// Resume at an absolute instant (always UTC).
    At {
        /// The resume instant.
        at: DateTime<Utc>,
    },
    /// Resume when an external actor wakes the execution.
    External {
        /// Resume at this instant anyway if no wake arrived (None = never).
        limit: Option<DateTime<Utc>>,
    },
}

impl WaitUntil {
    /// Wait until an absolute instant.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self::At { at }
    }

    /// Wait for an external wake with no deadline.
    pub fn external() -> Self {
        Self::External { limit: None }
    }

    /// The instant at which the host resumes on its own, if any.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At { at } => Some(*at),
            Self::External { limit } => *limit,
        }
    }

    /// Whether an external wake can end this wait.
    pub fn accepts_wake(&self) -> bool {
        matches!(self, Self::External { .. })
    }
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At { at } => write!(f, "at {}", at.to_rfc3339()),
            Self::External { limit: None } => f.write_str("external wake"),
            Self::External { limit: Some(limit) } => {
                write!(f, "external wake or {}", limit.to_rfc3339())
            }
        }
    }
}

/// How a suspension ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionOutcome {
    /// The resume condition was met.
    Resumed,
    /// The cancellation signal fired first.
    Canceled,
}

impl SuspensionOutcome {
    /// Check if the execution should continue.
    pub fn is_resumed(&self) -> bool {
        matches!(self, Self::Resumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn deadline_per_variant() {
        let at = instant("2024-06-02T00:00:00Z");
        assert_eq!(WaitUntil::at(at).deadline(), Some(at));
        assert_eq!(WaitUntil::external().deadline(), None);
        assert_eq!(WaitUntil::External { limit: Some(at) }.deadline(), Some(at));
    }

    #[test]
    fn only_external_waits_accept_wakes() {
        assert!(WaitUntil::external().accepts_wake());
        assert!(!WaitUntil::at(instant("2024-06-02T00:00:00Z")).accepts_wake());
    }

    #[test]
    fn wait_until_serializes_tagged() {
        let json = serde_json::to_value(WaitUntil::at(instant("2024-06-02T00:00:00Z"))).unwrap();
        assert_eq!(json["kind"], "at");
        assert_eq!(json["at"], "2024-06-02T00:00:00Z");
    }

    #[test]
    fn outcome_helpers() {
        assert!(SuspensionOutcome::Resumed.is_resumed());
        assert!(!SuspensionOutcome::Canceled.is_resumed());
    }
}

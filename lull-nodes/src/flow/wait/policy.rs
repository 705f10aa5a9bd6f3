//! Resume policy types.

use chrono::{DateTime, Duration, Utc};
use lull_core::suspension::WaitUntil;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// A configuration word outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected one of {expected}")]
pub struct UnknownChoice {
    /// The accepted spellings.
    pub expected: &'static str,
    /// What was supplied.
    pub got: String,
}

impl UnknownChoice {
    fn new(expected: &'static str, got: &str) -> Self {
        Self {
            expected,
            got: got.to_string(),
        }
    }
}

/// Unit of a relative wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeUnit {
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    #[default]
    Hours,
    /// Days.
    Days,
}

impl TimeUnit {
    /// The configuration spelling of this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }

    /// Length of `amount` of this unit.
    pub fn duration(&self, amount: NonZeroU32) -> Duration {
        let amount = i64::from(amount.get());
        match self {
            Self::Seconds => Duration::seconds(amount),
            Self::Minutes => Duration::minutes(amount),
            Self::Hours => Duration::hours(amount),
            Self::Days => Duration::days(amount),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "seconds" => Ok(Self::Seconds),
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            other => Err(UnknownChoice::new("seconds, minutes, hours, days", other)),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `resume` selector as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeMode {
    /// Resume after a relative interval.
    #[default]
    TimeInterval,
    /// Resume at an absolute date/time.
    SpecificTime,
    /// Resume when an external call wakes the execution.
    Webhook,
}

impl FromStr for ResumeMode {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "timeInterval" => Ok(Self::TimeInterval),
            "specificTime" => Ok(Self::SpecificTime),
            "webhook" => Ok(Self::Webhook),
            other => Err(UnknownChoice::new("timeInterval, specificTime, webhook", other)),
        }
    }
}

/// A validated description of when a suspended execution continues.
///
/// Every timestamp is UTC. Resolved once per invocation from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePolicy {
    /// Resume at an absolute instant.
    SpecificTime {
        /// The resume instant.
        target: DateTime<Utc>,
    },
    /// Resume after a relative duration, measured from resolution time.
    Interval {
        /// How many units to wait.
        amount: NonZeroU32,
        /// The unit of `amount`.
        unit: TimeUnit,
        /// The resume instant computed at resolution time.
        target: DateTime<Utc>,
    },
    /// Resume only when an outside actor wakes the execution.
    ExternalSignal {
        /// Resume anyway at this instant if no wake arrived.
        limit: Option<DateTime<Utc>>,
    },
}

impl ResumePolicy {
    /// What the host must wait for.
    pub fn wait_until(&self) -> WaitUntil {
        match self {
            Self::SpecificTime { target } | Self::Interval { target, .. } => WaitUntil::at(*target),
            Self::ExternalSignal { limit } => WaitUntil::External { limit: *limit },
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SpecificTime { .. } => "specific_time",
            Self::Interval { .. } => "interval",
            Self::ExternalSignal { .. } => "external_signal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u32) -> NonZeroU32 {
        NonZeroU32::new(v).unwrap()
    }

    #[test]
    fn unit_durations() {
        assert_eq!(TimeUnit::Seconds.duration(n(60)), Duration::seconds(60));
        assert_eq!(TimeUnit::Minutes.duration(n(2)), Duration::seconds(120));
        assert_eq!(TimeUnit::Hours.duration(n(1)), Duration::seconds(3600));
        assert_eq!(TimeUnit::Days.duration(n(1)), Duration::hours(24));
    }

    #[test]
    fn unit_parsing() {
        assert_eq!("seconds".parse(), Ok(TimeUnit::Seconds));
        assert_eq!(" days ".parse(), Ok(TimeUnit::Days));
        assert!("weeks".parse::<TimeUnit>().is_err());
        assert_eq!(TimeUnit::default(), TimeUnit::Hours);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("specificTime".parse(), Ok(ResumeMode::SpecificTime));
        assert_eq!("webhook".parse(), Ok(ResumeMode::Webhook));
        assert!("form".parse::<ResumeMode>().is_err());
        assert_eq!(ResumeMode::default(), ResumeMode::TimeInterval);
    }

    #[test]
    fn unknown_choice_reports_accepted_words() {
        let err = "fortnights".parse::<TimeUnit>().unwrap_err();
        assert_eq!(err.got, "fortnights");
        assert_eq!(err.to_string(), "expected one of seconds, minutes, hours, days");
    }

    #[test]
    fn policy_maps_to_wait_until() {
        let target = DateTime::parse_from_rfc3339("2024-06-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(
            ResumePolicy::SpecificTime { target }.wait_until(),
            WaitUntil::at(target)
        );
        assert_eq!(
            ResumePolicy::Interval {
                amount: n(5),
                unit: TimeUnit::Minutes,
                target
            }
            .wait_until(),
            WaitUntil::at(target)
        );
        assert_eq!(
            ResumePolicy::ExternalSignal { limit: None }.wait_until(),
            WaitUntil::external()
        );
    }
}

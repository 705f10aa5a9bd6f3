//! Turning raw wait parameters into a [`ResumePolicy`].
//!
//! Resolution is pure apart from parameter reads, one read of "now" for
//! relative waits and the timezone lookup for offset-naive dates. It never
//! touches the host's suspension machinery, so a rejected configuration leaves
//! nothing behind.

use super::datetime::normalize_date_time;
use super::policy::{ResumeMode, ResumePolicy, TimeUnit, UnknownChoice};
use chrono::{DateTime, Utc};
use lull_core::error::{LullError, Result};
use lull_core::traits::ExecutionHost;
use lull_core::value::{NodeParameters, ParamValue};
use std::num::NonZeroU32;
use std::str::FromStr;

/// Parameter names read by the resolver.
pub mod params {
    /// Resume mode selector.
    pub const RESUME: &str = "resume";
    /// Target date/time for `specificTime`.
    pub const DATE_TIME: &str = "dateTime";
    /// Interval amount for `timeInterval`.
    pub const AMOUNT: &str = "amount";
    /// Interval unit for `timeInterval`.
    pub const UNIT: &str = "unit";
    /// Whether a `webhook` wait has an upper bound.
    pub const LIMIT_WAIT: &str = "limitWait";
    /// How the upper bound is expressed.
    pub const LIMIT_TYPE: &str = "limitType";
    /// Bound amount for `afterTimeInterval`.
    pub const RESUME_AMOUNT: &str = "resumeAmount";
    /// Bound unit for `afterTimeInterval`.
    pub const RESUME_UNIT: &str = "resumeUnit";
    /// Bound instant for `atSpecifiedTime`.
    pub const MAX_DATE_AND_TIME: &str = "maxDateAndTime";
}

const AFTER_TIME_INTERVAL: &str = "afterTimeInterval";
const AT_SPECIFIED_TIME: &str = "atSpecifiedTime";

/// Resolve the host's parameters into a policy.
pub fn resolve(host: &dyn ExecutionHost) -> Result<ResumePolicy> {
    Resolver::new(host).resolve()
}

/// Reads wait parameters from a host, falling back to static defaults.
pub struct Resolver<'a> {
    host: &'a dyn ExecutionHost,
    defaults: Option<&'a NodeParameters>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver that only reads host parameters.
    pub fn new(host: &'a dyn ExecutionHost) -> Self {
        Self {
            host,
            defaults: None,
        }
    }

    /// Use `defaults` for any parameter the host leaves unset.
    pub fn with_defaults(mut self, defaults: &'a NodeParameters) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Produce the policy, or the first validation error found.
    pub fn resolve(&self) -> Result<ResumePolicy> {
        match self.mode()? {
            ResumeMode::TimeInterval => {
                let (amount, unit) = self.interval(params::AMOUNT, params::UNIT)?;
                let target = self.from_now(params::AMOUNT, amount, unit)?;
                Ok(ResumePolicy::Interval {
                    amount,
                    unit,
                    target,
                })
            }
            ResumeMode::SpecificTime => {
                let target = self.date_time(params::DATE_TIME)?;
                Ok(ResumePolicy::SpecificTime { target })
            }
            ResumeMode::Webhook => Ok(ResumePolicy::ExternalSignal {
                limit: self.limit()?,
            }),
        }
    }

    /// Look up a parameter; `null` counts as unset at either layer.
    fn param(&self, name: &str) -> Option<ParamValue> {
        self.host
            .node_parameter(name)
            .filter(|v| !v.is_null())
            .or_else(|| {
                self.defaults
                    .and_then(|d| d.get(name))
                    .filter(|v| !v.is_null())
                    .cloned()
            })
    }

    fn mode(&self) -> Result<ResumeMode> {
        match self.param(params::RESUME) {
            None => Ok(ResumeMode::default()),
            Some(value) => choice(params::RESUME, &value),
        }
    }

    fn interval(&self, amount_name: &str, unit_name: &str) -> Result<(NonZeroU32, TimeUnit)> {
        let unit = match self.param(unit_name) {
            None => TimeUnit::default(),
            Some(value) => choice(unit_name, &value)?,
        };

        let value = self.param(amount_name).ok_or_else(|| {
            LullError::invalid_parameter(amount_name, ParamValue::Null, "an amount is required")
        })?;
        let whole = value.as_integer().ok_or_else(|| {
            LullError::invalid_parameter(amount_name, &value, "must be a whole number")
        })?;
        if whole <= 0 {
            return Err(LullError::invalid_parameter(
                amount_name,
                &value,
                "must be greater than zero",
            ));
        }
        let amount = u32::try_from(whole)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| LullError::invalid_parameter(amount_name, &value, "is too large"))?;

        Ok((amount, unit))
    }

    fn from_now(&self, name: &str, amount: NonZeroU32, unit: TimeUnit) -> Result<DateTime<Utc>> {
        self.host
            .clock()
            .now()
            .checked_add_signed(unit.duration(amount))
            .ok_or_else(|| {
                LullError::invalid_parameter(
                    name,
                    amount,
                    format!("{amount} {unit} from now is out of range"),
                )
            })
    }

    fn date_time(&self, name: &str) -> Result<DateTime<Utc>> {
        let value = self.param(name).ok_or_else(|| {
            LullError::invalid_parameter(name, ParamValue::Null, "a date/time is required")
        })?;
        normalize_date_time(name, &value, &self.host.timezone())
    }

    fn limit(&self) -> Result<Option<DateTime<Utc>>> {
        let limited = match self.param(params::LIMIT_WAIT) {
            None => false,
            Some(value) => value.as_bool().ok_or_else(|| {
                LullError::invalid_parameter(params::LIMIT_WAIT, &value, "expected true or false")
            })?,
        };
        if !limited {
            return Ok(None);
        }

        let Some(limit_type) = self.param(params::LIMIT_TYPE) else {
            return self.limit_after_interval().map(Some);
        };
        match limit_type.as_str().map(str::trim) {
            Some(AFTER_TIME_INTERVAL) => self.limit_after_interval().map(Some),
            Some(AT_SPECIFIED_TIME) => self.date_time(params::MAX_DATE_AND_TIME).map(Some),
            _ => Err(LullError::invalid_parameter(
                params::LIMIT_TYPE,
                &limit_type,
                "expected afterTimeInterval or atSpecifiedTime",
            )),
        }
    }

    fn limit_after_interval(&self) -> Result<DateTime<Utc>> {
        let (amount, unit) = self.interval(params::RESUME_AMOUNT, params::RESUME_UNIT)?;
        self.from_now(params::RESUME_AMOUNT, amount, unit)
    }
}

/// Parse a string parameter into one of a fixed set of words.
fn choice<T: FromStr<Err = UnknownChoice>>(name: &str, value: &ParamValue) -> Result<T> {
    value
        .as_str()
        .unwrap_or_default()
        .parse()
        .map_err(|e: UnknownChoice| LullError::invalid_parameter(name, value, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lull_core::testing::{RecordedEvent, TestHostBuilder};

    const NOW: &str = "2024-06-01T12:00:00Z";

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn n(v: u32) -> NonZeroU32 {
        NonZeroU32::new(v).unwrap()
    }

    #[test]
    fn interval_from_now() {
        let host = TestHostBuilder::new()
            .with_fixed_time(NOW)
            .with_parameter("resume", "timeInterval")
            .with_parameter("amount", 60)
            .with_parameter("unit", "seconds")
            .build();

        assert_eq!(
            resolve(&host).unwrap(),
            ResumePolicy::Interval {
                amount: n(60),
                unit: TimeUnit::Seconds,
                target: utc("2024-06-01T12:01:00Z"),
            }
        );
    }

    #[test]
    fn interval_defaults_mode_and_unit() {
        let host = TestHostBuilder::new()
            .with_fixed_time(NOW)
            .with_parameter("amount", 2)
            .build();

        assert_eq!(
            resolve(&host).unwrap(),
            ResumePolicy::Interval {
                amount: n(2),
                unit: TimeUnit::Hours,
                target: utc("2024-06-01T14:00:00Z"),
            }
        );
    }

    #[test]
    fn interval_amount_must_be_positive_integer() {
        for amount in [
            ParamValue::int(0),
            ParamValue::int(-5),
            ParamValue::float(0.5),
            ParamValue::string("soon"),
            ParamValue::int(i64::from(u32::MAX) + 1),
        ] {
            let host = TestHostBuilder::new()
                .with_fixed_time(NOW)
                .with_parameter("resume", "timeInterval")
                .with_parameter("amount", amount.clone())
                .build();
            let err = resolve(&host).unwrap_err();
            assert_eq!(err.code(), "E1104", "amount {amount}");
            assert!(err.to_string().contains("'amount'"));
        }
    }

    #[test]
    fn whole_float_amount_is_accepted() {
        let host = TestHostBuilder::new()
            .with_fixed_time(NOW)
            .with_parameter("amount", 1.0)
            .with_parameter("unit", "days")
            .build();

        assert_eq!(
            resolve(&host).unwrap().wait_until().deadline(),
            Some(utc("2024-06-02T12:00:00Z"))
        );
    }

    #[test]
    fn missing_amount_is_rejected() {
        let host = TestHostBuilder::new().with_fixed_time(NOW).build();
        let err = resolve(&host).unwrap_err();
        assert!(err.to_string().contains("an amount is required"));
    }

    #[test]
    fn unknown_unit_and_mode_are_rejected() {
        let host = TestHostBuilder::new()
            .with_parameter("amount", 1)
            .with_parameter("unit", "fortnights")
            .build();
        let message = resolve(&host).unwrap_err().to_string();
        assert!(message.contains("'unit'"));
        assert!(message.ends_with("expected one of seconds, minutes, hours, days"));

        let host = TestHostBuilder::new().with_parameter("resume", "form").build();
        assert!(resolve(&host).unwrap_err().to_string().contains("'resume'"));
    }

    #[test]
    fn specific_time_uses_host_timezone() {
        let host = TestHostBuilder::new()
            .with_parameter("resume", "specificTime")
            .with_parameter("dateTime", "2024-06-02T00:00:00")
            .with_timezone("America/New_York")
            .build();

        assert_eq!(
            resolve(&host).unwrap(),
            ResumePolicy::SpecificTime {
                target: utc("2024-06-02T04:00:00Z")
            }
        );
    }

    #[test]
    fn specific_time_requires_a_value() {
        let host = TestHostBuilder::new()
            .with_parameter("resume", "specificTime")
            .with_parameter("dateTime", ParamValue::Null)
            .build();
        let err = resolve(&host).unwrap_err();
        assert!(err.to_string().contains("'dateTime'"));
    }

    #[test]
    fn webhook_without_limit() {
        let host = TestHostBuilder::new()
            .with_parameter("resume", "webhook")
            .build();
        assert_eq!(
            resolve(&host).unwrap(),
            ResumePolicy::ExternalSignal { limit: None }
        );
    }

    #[test]
    fn webhook_limit_after_interval() {
        let host = TestHostBuilder::new()
            .with_fixed_time(NOW)
            .with_parameter("resume", "webhook")
            .with_parameter("limitWait", true)
            .with_parameter("resumeAmount", 30)
            .with_parameter("resumeUnit", "minutes")
            .build();

        assert_eq!(
            resolve(&host).unwrap(),
            ResumePolicy::ExternalSignal {
                limit: Some(utc("2024-06-01T12:30:00Z"))
            }
        );
    }

    #[test]
    fn webhook_limit_at_specified_time() {
        let host = TestHostBuilder::new()
            .with_parameter("resume", "webhook")
            .with_parameter("limitWait", "true")
            .with_parameter("limitType", "atSpecifiedTime")
            .with_parameter("maxDateAndTime", "2024-07-01 09:00:00")
            .with_timezone("Europe/Berlin")
            .build();

        assert_eq!(
            resolve(&host).unwrap(),
            ResumePolicy::ExternalSignal {
                limit: Some(utc("2024-07-01T07:00:00Z"))
            }
        );
    }

    #[test]
    fn webhook_limit_disabled_ignores_limit_fields() {
        let host = TestHostBuilder::new()
            .with_parameter("resume", "webhook")
            .with_parameter("limitWait", false)
            .with_parameter("limitType", "bogus")
            .build();
        assert_eq!(
            resolve(&host).unwrap(),
            ResumePolicy::ExternalSignal { limit: None }
        );
    }

    #[test]
    fn webhook_unknown_limit_type_is_rejected() {
        let host = TestHostBuilder::new()
            .with_parameter("resume", "webhook")
            .with_parameter("limitWait", true)
            .with_parameter("limitType", "whenever")
            .build();
        let err = resolve(&host).unwrap_err();
        assert!(err.to_string().contains("'limitType'"));
    }

    #[test]
    fn defaults_fill_unset_parameters() {
        let defaults = NodeParameters::new()
            .with("resume", "timeInterval")
            .with("amount", 5)
            .with("unit", "minutes");
        let host = TestHostBuilder::new()
            .with_fixed_time(NOW)
            .with_parameter("amount", 10)
            .build();

        let policy = Resolver::new(&host).with_defaults(&defaults).resolve().unwrap();
        assert_eq!(
            policy,
            ResumePolicy::Interval {
                amount: n(10),
                unit: TimeUnit::Minutes,
                target: utc("2024-06-01T12:10:00Z"),
            }
        );
    }

    #[test]
    fn null_host_value_falls_back_to_default() {
        let defaults = NodeParameters::new().with("amount", 15).with("unit", "minutes");
        let host = TestHostBuilder::new()
            .with_fixed_time(NOW)
            .with_parameter("amount", ParamValue::Null)
            .build();

        let policy = Resolver::new(&host).with_defaults(&defaults).resolve().unwrap();
        assert_eq!(
            policy,
            ResumePolicy::Interval {
                amount: n(15),
                unit: TimeUnit::Minutes,
                target: utc("2024-06-01T12:15:00Z"),
            }
        );
    }

    #[test]
    fn interval_never_reads_timezone() {
        let host = TestHostBuilder::new()
            .with_fixed_time(NOW)
            .with_parameter("amount", 1)
            .with_timezone("Not/AZone")
            .build();

        resolve(&host).unwrap();
        assert!(
            !host
                .recorder()
                .events()
                .iter()
                .any(|e| matches!(e, RecordedEvent::TimezoneRead { .. }))
        );
    }
}

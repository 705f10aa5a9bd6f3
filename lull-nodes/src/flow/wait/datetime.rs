//! Date/time normalization.
//!
//! Turns any date-like parameter into a UTC instant. An explicit offset in the
//! value always wins; only offset-naive input is read in the configured
//! timezone.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use lull_core::error::{LullError, Result};
use lull_core::value::ParamValue;

/// Offset-carrying layouts tried after RFC 3339. `%#z` accepts `+02`, `+0200`
/// and `+02:00`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Offset-naive layouts: ISO with `T`, then SQL style with a space.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A parsed string, before timezone resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    Absolute(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

/// Normalize a date/time parameter to UTC.
///
/// `parameter` names the value in error messages. The timezone is only
/// consulted for offset-naive strings.
pub fn normalize_date_time(
    parameter: &str,
    value: &ParamValue,
    timezone: &str,
) -> Result<DateTime<Utc>> {
    match value {
        ParamValue::Date(date) => Ok(*date),
        ParamValue::DateTime(date) => Ok(date.with_timezone(&Utc)),
        ParamValue::String(text) => match parse(text) {
            Some(Parsed::Absolute(date)) => Ok(date.with_timezone(&Utc)),
            Some(Parsed::Naive(naive)) => {
                let tz = parse_timezone(timezone)?;
                localize(naive, tz).ok_or_else(|| {
                    LullError::invalid_parameter(
                        parameter,
                        value,
                        format!("does not exist in timezone {timezone}"),
                    )
                })
            }
            None => Err(LullError::invalid_parameter(
                parameter,
                value,
                "is not a valid date",
            )),
        },
        other => Err(LullError::invalid_parameter(
            parameter,
            other,
            format!("is not a valid date (got a {})", other.type_name()),
        )),
    }
}

/// Look up an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| LullError::invalid_parameter("timezone", format!("{name:?}"), "unknown timezone"))
}

fn parse(text: &str) -> Option<Parsed> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(Parsed::Absolute(date));
    }

    // `%#z` does not take a bare `Z`, so spell UTC out.
    let offset_text = match text.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => text.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(&offset_text, format) {
            return Some(Parsed::Absolute(date));
        }
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(Parsed::Absolute(date));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Parsed::Naive(naive));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Parsed::Naive)
}

/// Read a wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are read with the offset in force before the gap, which moves them
/// forward by exactly the gap's length.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(date) => Some(date.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            tracing::debug!(%naive, timezone = tz.name(), "Local time falls in a DST gap, shifting forward");
            let before = tz
                .offset_from_local_datetime(&(naive - Duration::days(1)))
                .earliest()?
                .fix();
            before
                .from_local_datetime(&naive)
                .single()
                .map(|date| date.with_timezone(&Utc))
        }
    }
}

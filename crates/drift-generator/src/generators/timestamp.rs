//! Instants rendered in the column's own temporal type.

use chrono::{DateTime, NaiveDate, Utc};
use drift_core::{DomainType, Value};
use rand::Rng;

/// Parsed, ordered bounds of a `timestamp_range` generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimestampBounds {
    /// Parse RFC 3339 timestamps or `YYYY-MM-DD` dates; `start` must not be
    /// after `end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        let parse = |s: &str| parse_instant(s).ok_or_else(|| format!("'{s}' is not a timestamp"));
        let bounds = Self {
            start: parse(start)?,
            end: parse(end)?,
        };
        if bounds.start > bounds.end {
            return Err(format!("start {start} is after end {end}"));
        }
        Ok(bounds)
    }

    /// Uniform instant in `start..=end`, at second precision.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> DateTime<Utc> {
        let secs = rng.gen_range(self.start.timestamp()..=self.end.timestamp());
        DateTime::from_timestamp(secs, 0).unwrap_or(self.start)
    }
}

/// An instant as a value of `domain_type`.
///
/// `date` and `timestamp` columns drop the offset (UTC); every other column
/// gets a `timestamptz` value.
pub fn temporal_value(instant: DateTime<Utc>, domain_type: &DomainType) -> Value {
    match domain_type {
        DomainType::Date => Value::Date(instant.date_naive()),
        DomainType::Timestamp => Value::Timestamp(instant.naive_utc()),
        _ => Value::TimestampTz(instant),
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

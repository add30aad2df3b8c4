//! Cutoff resolution.
//!
//! Turns the operator's age criteria into a single epoch-millisecond value
//! compared against Keycloak's `user_entity.created_timestamp`:
//!
//! 1. An explicit date wins: midnight UTC of that date.
//! 2. Otherwise a day count: midnight UTC today, minus N days.
//! 3. Otherwise "now", truncated to whole seconds. This still filters; it
//!    selects every user created up to the moment the tool runs.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Day count value that disables age-in-days filtering on the command line.
pub const DAYS_DISABLED: i64 = -1;

/// Calendar format accepted for explicit cutoff dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The operator's age criteria, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeCriteria {
    /// Maximum age in days. `None` means disabled.
    #[serde(default)]
    pub days: Option<u32>,

    /// Explicit cutoff date (`YYYY-MM-DD`). Takes priority over `days`.
    #[serde(default)]
    pub date: Option<String>,
}

impl AgeCriteria {
    /// Build criteria from raw command-line style values.
    ///
    /// Any negative day count is the disabled sentinel. An empty date is unset.
    pub fn from_raw(days: i64, date: &str) -> Result<Self> {
        Ok(Self {
            days: days_from_raw(days)?,
            date: if date.is_empty() { None } else { Some(date.to_string()) },
        })
    }

    /// The explicit date, if one is set and non-empty.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.is_empty())
    }

    /// True when neither a date nor a day count is set.
    pub fn is_unset(&self) -> bool {
        self.date().is_none() && self.days.is_none()
    }
}

/// Convert a raw day count to the optional form used by [`AgeCriteria`].
pub fn days_from_raw(days: i64) -> Result<Option<u32>> {
    if days < 0 {
        return Ok(None);
    }
    u32::try_from(days)
        .map(Some)
        .map_err(|_| Error::Config(format!("Day count {} is out of range", days)))
}

/// Which criterion produced a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSource {
    Date(NaiveDate),
    Days(u32),
    Now,
}

impl std::fmt::Display for ThresholdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdSource::Date(date) => write!(f, "date {}", date),
            ThresholdSource::Days(days) => write!(f, "{} days", days),
            ThresholdSource::Now => write!(f, "now"),
        }
    }
}

/// Inclusive upper bound on `created_timestamp`, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    millis: i64,
    source: ThresholdSource,
}

impl Threshold {
    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    pub fn source(&self) -> ThresholdSource {
        self.source
    }

    /// UTC calendar date containing the threshold.
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(self.millis).map(|t| t.date_naive())
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.date() {
            Some(date) => write!(f, "{} ({})", self.millis, date),
            None => write!(f, "{}", self.millis),
        }
    }
}

/// Resolve criteria against the current time.
pub fn resolve_now(criteria: &AgeCriteria) -> Result<Threshold> {
    resolve(criteria, Utc::now())
}

/// Resolve criteria against a fixed `now`.
pub fn resolve(criteria: &AgeCriteria, now: DateTime<Utc>) -> Result<Threshold> {
    if let Some(input) = criteria.date() {
        let date = parse_cutoff_date(input)?;
        return Ok(Threshold {
            millis: midnight_millis(date),
            source: ThresholdSource::Date(date),
        });
    }

    if let Some(days) = criteria.days {
        let date = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| Error::Config(format!("{} days before today is out of range", days)))?;
        return Ok(Threshold {
            millis: midnight_millis(date),
            source: ThresholdSource::Days(days),
        });
    }

    Ok(Threshold {
        millis: now.timestamp() * 1000,
        source: ThresholdSource::Now,
    })
}

/// Parse a cutoff date in strict `YYYY-MM-DD` form.
///
/// chrono accepts unpadded months and days, so the shape is checked first.
pub fn parse_cutoff_date(input: &str) -> Result<NaiveDate> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(Error::InvalidDateFormat {
            input: input.to_string(),
            reason: "not in YYYY-MM-DD form".to_string(),
        });
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|e| Error::InvalidDateFormat {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

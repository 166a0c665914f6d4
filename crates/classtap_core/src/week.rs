//! crates/classtap_core/src/week.rs
//!
//! Calendar-week identifiers. A week runs Sunday through Saturday and is
//! named after its starting Sunday, e.g. `Week of 10-18-2026`.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::ValidationError;

const DATE_FORMAT: &str = "%m-%d-%Y";

static WEEK_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Week of (\d{2}-\d{2}-\d{4})$").expect("valid week id pattern")
});

/// The most recent Sunday at or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = i64::from(date.weekday().num_days_from_sunday());
    date - Duration::days(days_since_sunday)
}

/// A week's id, `Week of MM-DD-YYYY`, together with the Sunday it names.
///
/// Ids order by their starting Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekId {
    starts_on: NaiveDate,
    label: String,
}

impl WeekId {
    /// The week containing `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        let starts_on = week_start(date);
        Self {
            starts_on,
            label: format!("Week of {}", starts_on.format(DATE_FORMAT)),
        }
    }

    /// The week containing `instant` as observed at `offset` from UTC.
    pub fn at(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::for_date(offset.from_utc_datetime(&instant.naive_utc()).date_naive())
    }

    /// Parses a client-supplied week id, which must name a Sunday.
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        let raw = crate::domain::required("weekId", value)?;
        let invalid = |reason: &str| ValidationError::Invalid {
            field: "weekId",
            reason: reason.to_string(),
        };

        let date_part = WEEK_ID_PATTERN
            .captures(raw)
            .and_then(|c| c.get(1))
            .ok_or_else(|| invalid("expected 'Week of MM-DD-YYYY'"))?
            .as_str();
        let starts_on = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map_err(|_| invalid("not a calendar date"))?;
        if starts_on.weekday() != Weekday::Sun {
            return Err(invalid("weeks start on Sunday"));
        }

        Ok(Self {
            starts_on,
            label: raw.to_string(),
        })
    }

    /// The Sunday this week starts on.
    pub fn starts_on(&self) -> NaiveDate {
        self.starts_on
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl TryFrom<String> for WeekId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(Some(&value))
    }
}

impl From<WeekId> for String {
    fn from(value: WeekId) -> Self {
        value.label
    }
}

impl std::fmt::Display for WeekId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Source of "now" for week resolution and log timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

//! Minute-resolution calendar time.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A calendar timestamp truncated to whole minutes.
///
/// `Time` is a pure value: every arithmetic operation returns a new value.
///
/// # Examples
///
/// ```
/// use glp_routing::models::Time;
///
/// let start = Time::from_ymd_hm(2025, 1, 31, 23, 30).unwrap();
/// let later = start.add_minutes(45);
/// assert_eq!(later.to_string(), "2025/02/01 00:15");
/// assert_eq!(start.minutes_until(later), 45);
/// assert_eq!(later.minutes_since(start), 45);
/// assert!(!start.is_same_day(later));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(NaiveDateTime);

impl Time {
    /// Builds a time from calendar fields.
    ///
    /// Returns `None` for an impossible date or clock reading.
    pub fn from_ymd_hm(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, 0)
            .map(Self)
    }

    /// Wraps a `chrono` timestamp, dropping seconds and below.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let secs = datetime.and_utc().timestamp();
        let floored = secs - secs.rem_euclid(60);
        let truncated = chrono::DateTime::from_timestamp(floored, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or(datetime);
        Self(truncated)
    }

    /// The underlying `chrono` timestamp.
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn add_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }

    pub fn sub_minutes(&self, minutes: i64) -> Self {
        Self(self.0 - Duration::minutes(minutes))
    }

    /// Minutes from `self` forward to `other` (negative if `other` is earlier).
    pub fn minutes_until(&self, other: Time) -> i64 {
        other.0.signed_duration_since(self.0).num_minutes()
    }

    /// Minutes elapsed from `other` to `self` (negative if `other` is later).
    pub fn minutes_since(&self, other: Time) -> i64 {
        -self.minutes_until(other)
    }

    pub fn is_before(&self, other: Time) -> bool {
        self.0 < other.0
    }

    pub fn is_after(&self, other: Time) -> bool {
        self.0 > other.0
    }

    pub fn is_same_day(&self, other: Time) -> bool {
        self.0.date() == other.0.date()
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y/%m/%d %H:%M"))
    }
}

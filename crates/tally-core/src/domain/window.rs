//! Calendar-aligned quota windows.
//!
//! All bucket arithmetic is done in UTC, so bucket boundaries never shift
//! with the host timezone or daylight saving.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Datelike, Months, TimeDelta, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A window resolution tracked by the quota gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minute,
    Hour,
    Day,
    Month,
}

impl Granularity {
    /// Every granularity, finest first.
    pub const ALL: [Granularity; 4] = [
        Granularity::Minute,
        Granularity::Hour,
        Granularity::Day,
        Granularity::Month,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Month => "month",
        }
    }

    /// Adverb form used in user-facing messages ("hourly", "daily").
    pub fn adverb(&self) -> &'static str {
        match self {
            Granularity::Minute => "minutely",
            Granularity::Hour => "hourly",
            Granularity::Day => "daily",
            Granularity::Month => "monthly",
        }
    }

    /// Counter time-to-live. The month uses a fixed 30-day approximation.
    pub fn ttl(&self) -> Duration {
        let secs = match self {
            Granularity::Minute => 60,
            Granularity::Hour => 3_600,
            Granularity::Day => 86_400,
            Granularity::Month => 2_592_000,
        };
        Duration::from_secs(secs)
    }

    /// Start of the calendar bucket containing `now`.
    pub fn bucket_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let (year, month, day, hour, minute) = match self {
            Granularity::Minute => (now.year(), now.month(), now.day(), now.hour(), now.minute()),
            Granularity::Hour => (now.year(), now.month(), now.day(), now.hour(), 0),
            Granularity::Day => (now.year(), now.month(), now.day(), 0, 0),
            Granularity::Month => (now.year(), now.month(), 1, 0, 0),
        };

        // Every field comes from a valid UTC instant, so the mapping is unique.
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .unwrap_or(now)
    }

    /// Derive the counter key for `operation` in the bucket containing `now`.
    ///
    /// Format: `quota:{granularity}:{bucket}:{operation}`. The granularity and
    /// bucket segments never contain `:`, so the operation (which may) sits last
    /// and keys stay unambiguous.
    pub fn bucket_key(&self, operation: &str, now: DateTime<Utc>) -> String {
        let pattern = match self {
            Granularity::Minute => "%Y%m%d%H%M",
            Granularity::Hour => "%Y%m%d%H",
            Granularity::Day => "%Y%m%d",
            Granularity::Month => "%Y%m",
        };

        format!(
            "quota:{}:{}:{}",
            self.as_str(),
            self.bucket_start(now).format(pattern),
            operation
        )
    }

    /// Instant at which the bucket containing `now` rolls over.
    pub fn reset_instant(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let start = self.bucket_start(now);
        match self {
            Granularity::Minute => start + TimeDelta::minutes(1),
            Granularity::Hour => start + TimeDelta::hours(1),
            Granularity::Day => start + TimeDelta::days(1),
            Granularity::Month => start
                .checked_add_months(Months::new(1))
                .unwrap_or_else(|| start + TimeDelta::days(31)),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_ordering_is_finest_first() {
        let mut sorted = Granularity::ALL;
        sorted.sort();
        assert_eq!(sorted, Granularity::ALL);
        assert!(Granularity::Minute < Granularity::Month);
    }

    #[test]
    fn test_ttls() {
        assert_eq!(Granularity::Minute.ttl().as_secs(), 60);
        assert_eq!(Granularity::Hour.ttl().as_secs(), 3600);
        assert_eq!(Granularity::Day.ttl().as_secs(), 86400);
        assert_eq!(Granularity::Month.ttl().as_secs(), 2_592_000);
    }

    #[test]
    fn test_key_format() {
        let now = at(2024, 3, 10, 10, 5, 42);
        assert_eq!(
            Granularity::Minute.bucket_key("tweet", now),
            "quota:minute:202403101005:tweet"
        );
        assert_eq!(Granularity::Hour.bucket_key("tweet", now), "quota:hour:2024031010:tweet");
        assert_eq!(Granularity::Day.bucket_key("tweet", now), "quota:day:20240310:tweet");
        assert_eq!(Granularity::Month.bucket_key("tweet", now), "quota:month:202403:tweet");
    }

    #[test]
    fn test_minute_key_is_calendar_aligned() {
        let a = Granularity::Minute.bucket_key("tweet", at(2024, 3, 10, 10, 0, 0));
        let b = Granularity::Minute.bucket_key("tweet", at(2024, 3, 10, 10, 0, 59));
        let c = Granularity::Minute.bucket_key("tweet", at(2024, 3, 10, 10, 1, 0));
        assert_eq!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn test_coarser_keys_span_their_bucket() {
        let early = at(2024, 3, 10, 10, 0, 0);
        let late = at(2024, 3, 10, 10, 59, 59);
        assert_eq!(
            Granularity::Hour.bucket_key("tweet", early),
            Granularity::Hour.bucket_key("tweet", late)
        );
        assert_ne!(
            Granularity::Hour.bucket_key("tweet", late),
            Granularity::Hour.bucket_key("tweet", at(2024, 3, 10, 11, 0, 0))
        );
        assert_eq!(
            Granularity::Month.bucket_key("tweet", at(2024, 3, 1, 0, 0, 0)),
            Granularity::Month.bucket_key("tweet", at(2024, 3, 31, 23, 59, 59))
        );
        assert_ne!(
            Granularity::Day.bucket_key("tweet", at(2024, 3, 10, 23, 59, 59)),
            Granularity::Day.bucket_key("tweet", at(2024, 3, 11, 0, 0, 0))
        );
    }

    #[test]
    fn test_keys_do_not_collide_across_operations_or_granularities() {
        let now = at(2024, 3, 10, 10, 5, 0);
        let mut keys = Vec::new();
        for operation in ["tweet", "reply", "tweet:minute"] {
            for granularity in Granularity::ALL {
                keys.push(granularity.bucket_key(operation, now));
            }
        }
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn test_reset_instants() {
        let now = at(2024, 3, 10, 10, 5, 42);
        assert_eq!(Granularity::Minute.reset_instant(now), at(2024, 3, 10, 10, 6, 0));
        assert_eq!(Granularity::Hour.reset_instant(now), at(2024, 3, 10, 11, 0, 0));
        assert_eq!(Granularity::Day.reset_instant(now), at(2024, 3, 11, 0, 0, 0));
        assert_eq!(Granularity::Month.reset_instant(now), at(2024, 4, 1, 0, 0, 0));
    }

    #[test]
    fn test_reset_instants_roll_over_the_year() {
        let now = at(2024, 12, 31, 23, 59, 30);
        assert_eq!(Granularity::Minute.reset_instant(now), at(2025, 1, 1, 0, 0, 0));
        assert_eq!(Granularity::Hour.reset_instant(now), at(2025, 1, 1, 0, 0, 0));
        assert_eq!(Granularity::Day.reset_instant(now), at(2025, 1, 1, 0, 0, 0));
        assert_eq!(Granularity::Month.reset_instant(now), at(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_reset_from_end_of_short_month() {
        let now = at(2024, 2, 29, 12, 0, 0);
        assert_eq!(Granularity::Month.reset_instant(now), at(2024, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Granularity::Hour).unwrap(), "\"hour\"");
        assert_eq!(Granularity::Day.to_string(), "day");
        assert_eq!(Granularity::Month.adverb(), "monthly");
    }
}

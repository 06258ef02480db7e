//! Calendar day keys for history grouping.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

/// A calendar day with no time-of-day component.
///
/// Ordered by calendar date. Displays as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Create a key from year, month and day. Returns `None` for invalid dates.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Underlying chrono date.
    #[must_use]
    pub fn as_naive(self) -> NaiveDate {
        self.0
    }

    /// Site-relative link to this day's page (e.g., `/2024/01/05`).
    #[must_use]
    pub fn link_path(self) -> String {
        format!("/{:04}/{:02}/{:02}", self.year(), self.month(), self.day())
    }

    /// Midnight UTC of this day.
    ///
    /// Historical pages carry no finer timestamp than the day itself.
    #[must_use]
    pub fn canonical_timestamp(self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_and_display() {
        let date: DateKey = "2024-01-05".parse().unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 5);
        assert_eq!(date.to_string(), "2024-01-05");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2024-13-01".parse::<DateKey>().is_err());
        assert!("yesterday".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_link_path_is_zero_padded() {
        let date = DateKey::from_ymd(2024, 2, 1).unwrap();
        assert_eq!(date.link_path(), "/2024/02/01");
    }

    #[test]
    fn test_canonical_timestamp_is_midnight_utc() {
        let date = DateKey::from_ymd(2024, 1, 20).unwrap();
        assert_eq!(
            date.canonical_timestamp().to_rfc3339(),
            "2024-01-20T00:00:00+00:00"
        );
    }

    #[test]
    fn test_ordering_is_calendar_order() {
        let a = DateKey::from_ymd(2023, 12, 31).unwrap();
        let b = DateKey::from_ymd(2024, 1, 1).unwrap();
        assert!(a < b);
    }
}

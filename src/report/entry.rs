use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

use crate::errors::ReportError;

/// One raw observation: a value recorded against a key at an instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry<T> {
    pub key: String,
    pub value: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> ReportEntry<T> {
    pub fn new(key: impl Into<String>, value: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            value,
            timestamp,
        }
    }
}

/// A calendar month, ordered chronologically and rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is within `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Calendar month containing `timestamp` as observed in `zone`.
    pub fn from_instant(timestamp: DateTime<Utc>, zone: &FixedOffset) -> Self {
        let local = timestamp.with_timezone(zone);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The following month, or `None` past the last representable year.
    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Some(Self {
                year: self.year.checked_add(1)?,
                month: 1,
            })
        } else {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ReportError::InvalidMonth(value.to_string());
        let trimmed = value.trim();
        let (year, month) = trimmed.rsplit_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn month_follows_configured_zone() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 31, 22, 30, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            YearMonth::from_instant(instant, &utc),
            YearMonth::new(2025, 3).unwrap()
        );
        assert_eq!(
            YearMonth::from_instant(instant, &tokyo),
            YearMonth::new(2025, 4).unwrap()
        );
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(YearMonth::new(2025, 0).is_none());
        assert!(YearMonth::new(2025, 13).is_none());
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn display_and_parse_agree() {
        let month: YearMonth = "2024-02".parse().expect("valid month");
        assert_eq!(month.to_string(), "2024-02");
        assert_eq!(month.next(), YearMonth::new(2024, 3));
        assert_eq!(YearMonth::new(2024, 12).unwrap().next(), YearMonth::new(2025, 1));
    }

    #[test]
    fn next_stops_at_last_representable_month() {
        assert_eq!(YearMonth::new(i32::MAX, 12).unwrap().next(), None);
        assert_eq!(
            YearMonth::new(i32::MAX, 11).unwrap().next(),
            YearMonth::new(i32::MAX, 12)
        );
    }

    #[test]
    fn serializes_as_string() {
        let month = YearMonth::new(2025, 4).unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2025-04\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
    }
}

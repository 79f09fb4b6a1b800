#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use report_core::{core::FixedClock, report::YearMonth};

/// Fixed "now" shared by the integration suites: 2025-04-15 12:00 UTC.
pub fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 4, 15, 12, 0, 0).unwrap())
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

pub fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).expect("valid month")
}

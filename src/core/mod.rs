//! Application services layered over a [`crate::report::ReportRepository`].

pub mod services;
pub mod time;

pub use time::{Clock, FixedClock, SystemClock};

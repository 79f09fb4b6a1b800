use std::{collections::BTreeMap, fmt::Display, fmt::Write as _};

use serde::Serialize;

use crate::errors::ReportError;
use crate::report::{ReportEntry, ReportRepository, YearMonth};

use super::ServiceResult;

/// Text formats supported by [`ExportService::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// `month,total` header followed by one row per month.
    Csv,
    /// Array of `{ "month": "YYYY-MM", "total": value }` objects.
    Json,
}

#[derive(Serialize)]
struct MonthTotal<'a, T> {
    month: YearMonth,
    total: &'a T,
}

pub struct ExportService;

impl ExportService {
    /// Monthly totals for `key`, sorted by month.
    pub fn monthly<T, R>(repo: &R, key: &str) -> ServiceResult<Vec<(YearMonth, T)>>
    where
        R: ReportRepository<T> + ?Sized,
    {
        let mut rows: Vec<_> = repo.find_all_monthly_values(key)?.into_iter().collect();
        rows.sort_by_key(|(month, _)| *month);
        Ok(rows)
    }

    /// Pending entries of one bucket as recorded.
    pub fn raw_entries<T, R>(
        repo: &R,
        key: &str,
        month: YearMonth,
    ) -> ServiceResult<Vec<ReportEntry<T>>>
    where
        R: ReportRepository<T> + ?Sized,
    {
        Ok(repo.find_pending_entries(key, month)?)
    }

    /// Monthly totals for every key.
    pub fn all_keys<T, R>(repo: &R) -> ServiceResult<BTreeMap<String, BTreeMap<YearMonth, T>>>
    where
        R: ReportRepository<T> + ?Sized,
    {
        let mut out = BTreeMap::new();
        for key in repo.find_keys()? {
            let monthly = repo.find_all_monthly_values(&key)?.into_iter().collect();
            out.insert(key, monthly);
        }
        Ok(out)
    }

    /// Renders the monthly totals of `key` in `format`.
    pub fn render<T, R>(repo: &R, key: &str, format: ExportFormat) -> ServiceResult<String>
    where
        T: Display + Serialize,
        R: ReportRepository<T> + ?Sized,
    {
        let rows = Self::monthly(repo, key)?;
        match format {
            ExportFormat::Csv => {
                let mut out = String::from("month,total\n");
                for (month, total) in &rows {
                    // Writing into a String cannot fail.
                    let _ = writeln!(out, "{},{}", month, total);
                }
                Ok(out)
            }
            ExportFormat::Json => {
                let payload: Vec<_> = rows
                    .iter()
                    .map(|(month, total)| MonthTotal {
                        month: *month,
                        total,
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&payload).map_err(ReportError::from)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::LongOperator;
    use crate::report::MonthlyReport;
    use chrono::{TimeZone, Utc};

    fn seeded() -> MonthlyReport<i64, LongOperator> {
        let report = MonthlyReport::with_utc(LongOperator);
        report.add("visits", 12, Utc.with_ymd_and_hms(2025, 4, 2, 0, 0, 0).unwrap());
        report.add("visits", 30, Utc.with_ymd_and_hms(2025, 3, 9, 0, 0, 0).unwrap());
        report.add("visits", 8, Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
        report.add("orders", 3, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        report
    }

    #[test]
    fn csv_rows_are_chronological() {
        let csv = ExportService::render(&seeded(), "visits", ExportFormat::Csv).unwrap();
        assert_eq!(csv, "month,total\n2025-03,38\n2025-04,12\n");
    }

    #[test]
    fn json_uses_month_strings() {
        let json = ExportService::render(&seeded(), "visits", ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["month"], "2025-03");
        assert_eq!(parsed[0]["total"], 38);
        assert_eq!(parsed[1]["total"], 12);
    }

    #[test]
    fn all_keys_and_raw_entries() {
        let report = seeded();
        let all = ExportService::all_keys(&report).unwrap();
        assert_eq!(all.keys().cloned().collect::<Vec<_>>(), vec!["orders", "visits"]);
        let march = YearMonth::new(2025, 3).unwrap();
        assert_eq!(all["visits"][&march], 38);

        let raw = ExportService::raw_entries(&report, "visits", march).unwrap();
        assert_eq!(raw.iter().map(|e| e.value).collect::<Vec<_>>(), vec![30, 8]);

        let empty = ExportService::render(&report, "missing", ExportFormat::Csv).unwrap();
        assert_eq!(empty, "month,total\n");
    }
}

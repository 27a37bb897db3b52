//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closed date range for reporting windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Close an optionally open-ended window. A missing start falls back to
    /// the Unix epoch and a missing end falls back to `today`.
    pub fn close_open_ends(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        Self {
            start: start.unwrap_or_default(),
            end: end.unwrap_or(today),
        }
    }
}

/// Grouping granularity for the P&L series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Month,
    Year,
}

impl Granularity {
    /// Postgres `TO_CHAR` pattern producing this granularity's period key.
    pub fn pg_format(self) -> &'static str {
        match self {
            Granularity::Day => "YYYY-MM-DD",
            Granularity::Month => "YYYY-MM",
            Granularity::Year => "YYYY",
        }
    }

    /// Period key for a date, matching [`Self::pg_format`].
    pub fn period_key(self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Month => date.format("%Y-%m").to_string(),
            Granularity::Year => date.format("%Y").to_string(),
        }
    }
}

/// Pagination parameters for list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 200;

    /// Clamp to sane bounds: page >= 1, 1 <= limit <= [`Self::MAX_LIMIT`].
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(self) -> i64 {
        let p = self.clamped();
        i64::from(p.page - 1) * i64::from(p.limit)
    }
}

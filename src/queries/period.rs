use chrono::{Datelike, Month, NaiveDate};
use serde::Serialize;

use crate::db::sighting_repo::SightingFilter;

/// A span of time a list or summary is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    AllTime,
    Year { year: i32 },
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn year(year: i32) -> Self {
        if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
            return Period::AllTime;
        }
        Period::Year { year }
    }

    /// A calendar month. Months outside 1..=12 fall back to all time.
    pub fn month(year: i32, month: u32) -> Self {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Period::AllTime;
        }
        Period::Month { year, month }
    }

    pub fn containing(date: NaiveDate) -> (Self, Self) {
        (Period::year(date.year()), Period::month(date.year(), date.month()))
    }

    /// Half-open `[from, until)` date bounds. `None` means unbounded.
    pub fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match *self {
            Period::AllTime => (None, None),
            Period::Year { year } => (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year + 1, 1, 1),
            ),
            Period::Month { year, month } => {
                let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
                (
                    NaiveDate::from_ymd_opt(year, month, 1),
                    NaiveDate::from_ymd_opt(next_year, next_month, 1),
                )
            }
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.bounds().0
    }

    pub fn filter(&self) -> SightingFilter {
        let (from, until) = self.bounds();
        SightingFilter::between(from, until)
    }

    /// The period immediately before this one. All time has no predecessor.
    pub fn previous(&self) -> Self {
        match *self {
            Period::AllTime => Period::AllTime,
            Period::Year { year } => Period::year(year - 1),
            Period::Month { year, month: 1 } => Period::month(year - 1, 12),
            Period::Month { year, month } => Period::month(year, month - 1),
        }
    }

    pub fn label(&self) -> String {
        match *self {
            Period::AllTime => "All time".to_string(),
            Period::Year { year } => year.to_string(),
            Period::Month { year, month } => format!("{} {}", month_name(month), year),
        }
    }
}

/// English month name for 1..=12, empty otherwise.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

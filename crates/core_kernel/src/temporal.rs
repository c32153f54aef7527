//! Date range types for period-bounded queries
//!
//! Journal entries carry a calendar date (no time of day). Every report in
//! the ledger is bounded by an inclusive `[start, end]` range of such dates.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Invalid month: {year}-{month}")]
    InvalidMonth {
        year: i32,
        month: u32,
    },
}

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A range covering every representable date
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    /// Builds a range from optional bounds, open ends becoming unbounded
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, TemporalError> {
        Self::new(start.unwrap_or(NaiveDate::MIN), end.unwrap_or(NaiveDate::MAX))
    }

    /// The calendar month containing `year`/`month`
    pub fn month(year: i32, month: u32) -> Result<Self, TemporalError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(TemporalError::InvalidMonth { year, month })?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(TemporalError::InvalidMonth { year, month })?;
        Ok(Self { start, end })
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        // A date always lies in a representable month
        Self::month(date.year(), date.month()).unwrap_or(Self { start: date, end: date })
    }

    /// Returns true if `date` lies within the range (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns true if the range has no lower bound
    pub fn is_open_start(&self) -> bool {
        self.start == NaiveDate::MIN
    }

    /// Returns true if the range has no upper bound
    pub fn is_open_end(&self) -> bool {
        self.end == NaiveDate::MAX
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_month_handles_leap_year() {
        let feb = DateRange::month(2024, 2).unwrap();
        assert_eq!(feb.end, date(2024, 2, 29));
        assert_eq!(feb.days(), 29);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let result = DateRange::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }
}

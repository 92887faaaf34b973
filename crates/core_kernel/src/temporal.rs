//! Accounting-date helpers
//!
//! Ledger dates are calendar dates (`NaiveDate`) with no time-of-day or
//! timezone attached. Billing periods are half-open: `[start, end)`.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of months in one billing cycle
pub const BILLING_CYCLE_MONTHS: u32 = 12;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Date out of range: {0} plus {1}")]
    OutOfRange(NaiveDate, String),
}

/// A half-open date range `[start, end)` covered by one bill
///
/// Consecutive periods for the same subject chain end-to-start, so the end
/// of one period is exactly the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingPeriod {
    /// Creates a period from explicit bounds
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start >= end {
            return Err(TemporalError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates the twelve-month period beginning at `start`
    ///
    /// Month arithmetic clamps to the last day of the month, so a period
    /// starting on 29 February ends on 28 February of the following year.
    pub fn annual(start: NaiveDate) -> Result<Self, TemporalError> {
        let end = start
            .checked_add_months(Months::new(BILLING_CYCLE_MONTHS))
            .ok_or_else(|| {
                TemporalError::OutOfRange(start, format!("{} months", BILLING_CYCLE_MONTHS))
            })?;
        Self::new(start, end)
    }

    /// Inclusive start date
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end date
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns true once the whole period lies on or before `as_of`
    pub fn is_complete_by(&self, as_of: NaiveDate) -> bool {
        self.end <= as_of
    }

    /// The period immediately following this one
    pub fn next(&self) -> Result<Self, TemporalError> {
        Self::annual(self.end)
    }

    /// `end + days`, used for payment due dates
    pub fn end_plus_days(&self, days: u32) -> Result<NaiveDate, TemporalError> {
        self.end
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| TemporalError::OutOfRange(self.end, format!("{} days", days)))
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_annual_period() {
        let period = BillingPeriod::annual(date(2023, 1, 1)).unwrap();
        assert_eq!(period.start(), date(2023, 1, 1));
        assert_eq!(period.end(), date(2024, 1, 1));
    }

    #[test]
    fn test_leap_day_clamps() {
        let period = BillingPeriod::annual(date(2024, 2, 29)).unwrap();
        assert_eq!(period.end(), date(2025, 2, 28));
    }

    #[test]
    fn test_next_is_contiguous() {
        let first = BillingPeriod::annual(date(2023, 6, 15)).unwrap();
        let second = first.next().unwrap();
        assert_eq!(second.start(), first.end());
    }

    #[test]
    fn test_is_complete_by_is_inclusive_of_end() {
        let period = BillingPeriod::annual(date(2023, 1, 1)).unwrap();
        assert!(!period.is_complete_by(date(2023, 12, 31)));
        assert!(period.is_complete_by(date(2024, 1, 1)));
    }

    #[test]
    fn test_invalid_period() {
        let result = BillingPeriod::new(date(2024, 1, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_due_date() {
        let period = BillingPeriod::annual(date(2023, 1, 1)).unwrap();
        assert_eq!(period.end_plus_days(30).unwrap(), date(2024, 1, 31));
    }
}

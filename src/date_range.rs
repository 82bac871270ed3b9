//! Inclusive calendar date ranges used by the report and listing pages.

use serde::Deserialize;
use time::{Date, Duration};

use crate::Error;

/// An inclusive range of calendar dates in the business timezone.
///
/// Dates are compared as calendar days (`YYYY-MM-DD`), never as instants, so a
/// sale rung up just before midnight always lands on the day it was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first day in the range.
    pub start: Date,
    /// The last day in the range, included.
    pub end: Date,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `end` comes before `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidDateRange(start, end));
        }

        Ok(Self { start, end })
    }

    /// The calendar month that contains `date`.
    pub fn month_of(date: Date) -> Self {
        let start = date.replace_day(1).unwrap_or(date);
        let end = Date::from_calendar_date(
            date.year(),
            date.month(),
            date.month().length(date.year()),
        )
        .unwrap_or(date);

        Self { start, end }
    }

    /// The `days` days ending on `end`, including `end` itself.
    pub fn last_days(end: Date, days: i64) -> Self {
        let start = end
            .checked_sub(Duration::days(days.max(1) - 1))
            .unwrap_or(end);

        Self { start, end }
    }

    /// Whether `date` falls within the range. Both ends are included.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// The range as URL query parameters, e.g. "start=2025-01-01&end=2025-01-31".
    pub fn to_query_string(&self) -> String {
        format!("start={}&end={}", self.start, self.end)
    }
}

/// Query parameters selecting a date range.
///
/// Missing values fall back to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRangeQuery {
    /// Resolve the query into a range, using the month containing `today` for
    /// any missing end.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if the resolved end comes before the start.
    pub fn resolve(&self, today: Date) -> Result<DateRange, Error> {
        let month = DateRange::month_of(today);

        DateRange::new(
            self.start.unwrap_or(month.start),
            self.end.unwrap_or(month.end),
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{DateRange, DateRangeQuery};

    #[test]
    fn month_of_covers_whole_month() {
        let range = DateRange::month_of(date!(2024 - 02 - 14));

        assert_eq!(range.start, date!(2024 - 02 - 01));
        assert_eq!(range.end, date!(2024 - 02 - 29));
    }

    #[test]
    fn contains_is_inclusive() {
        let range = DateRange::new(date!(2025 - 03 - 01), date!(2025 - 03 - 31)).unwrap();

        assert!(range.contains(date!(2025 - 03 - 01)));
        assert!(range.contains(date!(2025 - 03 - 31)));
        assert!(!range.contains(date!(2025 - 04 - 01)));
        assert!(!range.contains(date!(2025 - 02 - 28)));
    }

    #[test]
    fn single_day_range_contains_only_that_day() {
        let day = date!(2025 - 06 - 15);
        let range = DateRange::new(day, day).unwrap();

        assert!(range.contains(day));
        assert!(!range.contains(date!(2025 - 06 - 14)));
        assert!(!range.contains(date!(2025 - 06 - 16)));
    }

    #[test]
    fn new_rejects_end_before_start() {
        let start = date!(2025 - 03 - 02);
        let end = date!(2025 - 03 - 01);

        assert_eq!(
            DateRange::new(start, end),
            Err(Error::InvalidDateRange(start, end))
        );
    }

    #[test]
    fn last_days_includes_end() {
        let range = DateRange::last_days(date!(2025 - 01 - 30), 30);

        assert_eq!(range.start, date!(2025 - 01 - 01));
        assert_eq!(range.end, date!(2025 - 01 - 30));
    }

    #[test]
    fn empty_query_resolves_to_current_month() {
        let range = DateRangeQuery::default()
            .resolve(date!(2025 - 11 - 20))
            .unwrap();

        assert_eq!(range.start, date!(2025 - 11 - 01));
        assert_eq!(range.end, date!(2025 - 11 - 30));
    }

    #[test]
    fn query_string_uses_iso_dates() {
        let range = DateRange::new(date!(2025 - 01 - 05), date!(2025 - 01 - 09)).unwrap();

        assert_eq!(range.to_query_string(), "start=2025-01-05&end=2025-01-09");
    }
}

//! Daily totals shown on the dashboard.

use time::{Date, Month};

use crate::{date_range::DateRange, transaction::Transaction};

/// The sales made on one day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(super) struct DaySummary {
    /// The number of cars washed.
    pub visits: usize,
    /// What customers paid for services and extras.
    pub revenue: f64,
    pub tips: f64,
}

/// Total up the sales made on `day`.
pub(super) fn summarise_day(transactions: &[Transaction], day: Date) -> DaySummary {
    transactions
        .iter()
        .filter(|transaction| transaction.date == day)
        .fold(DaySummary::default(), |summary, transaction| DaySummary {
            visits: summary.visits + 1,
            revenue: summary.revenue + transaction.revenue(),
            tips: summary.tips + transaction.tip,
        })
}

/// The revenue for every day in `range`, oldest first. Days without sales are zero.
pub(super) fn daily_revenue(transactions: &[Transaction], range: &DateRange) -> Vec<(Date, f64)> {
    let mut totals = Vec::new();
    let mut day = range.start;

    while day <= range.end {
        totals.push((day, summarise_day(transactions, day).revenue));

        day = match day.next_day() {
            Some(next_day) => next_day,
            None => break,
        };
    }

    totals
}

/// Short labels for the chart axis, e.g. "14 Mar".
pub(super) fn format_day_labels(days: &[Date]) -> Vec<String> {
    let month_to_str = |month: Month| match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    days.iter()
        .map(|day| format!("{} {}", day.day(), month_to_str(day.month())))
        .collect()
}

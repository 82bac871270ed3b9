//! Totals an employee's earnings over a date range.

use serde::Serialize;

use crate::{
    commission::attribution::{Attribution, attribute, is_worker, worker_count},
    date_range::DateRange,
    employee::EmployeeId,
    expense::Expense,
    transaction::Transaction,
};

/// An employee's earnings and expenses over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub employee_id: EmployeeId,
    /// Cars worked on. A car shared by `n` employees counts `1 / n` for each.
    pub visits: f64,
    /// Commission from the shared pool and assigned extras.
    pub commission: f64,
    pub tips: f64,
    /// Expenses paid by the employee.
    pub expenses: f64,
    /// `commission + tips - expenses`.
    pub net: f64,
}

/// The sales in `range` that `employee_id` worked on, paired with what they
/// earned from each. Keeps the order of `transactions`.
pub fn attributions_in_range<'a>(
    transactions: &'a [Transaction],
    employee_id: EmployeeId,
    range: &DateRange,
) -> Vec<(&'a Transaction, Attribution)> {
    transactions
        .iter()
        .filter(|transaction| {
            range.contains(transaction.date) && is_worker(transaction, employee_id)
        })
        .map(|transaction| (transaction, attribute(transaction, employee_id)))
        .collect()
}

/// Total up what `employee_id` earned and spent in `range`.
///
/// Transactions and expenses outside the range, or belonging to other
/// employees, are ignored, so callers may pass unfiltered lists.
pub fn aggregate(
    transactions: &[Transaction],
    expenses: &[Expense],
    employee_id: EmployeeId,
    range: &DateRange,
) -> EmployeeSummary {
    let mut visits = 0.0;
    let mut commission = 0.0;
    let mut tips = 0.0;

    for (transaction, attribution) in attributions_in_range(transactions, employee_id, range) {
        visits += 1.0 / worker_count(transaction) as f64;
        commission += attribution.commission();
        tips += attribution.tip_share;
    }

    let expenses: f64 = expenses
        .iter()
        .filter(|expense| expense.employee_id == Some(employee_id) && range.contains(expense.date))
        .map(|expense| expense.amount)
        .filter(|amount| amount.is_finite())
        .sum();

    EmployeeSummary {
        employee_id,
        visits,
        commission,
        tips,
        expenses,
        net: commission + tips - expenses,
    }
}

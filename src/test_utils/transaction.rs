use time::macros::date;

use crate::{employee::EmployeeId, transaction::Transaction};

/// A $40 sale on 2025-03-14 that has not been saved, credited to the first
/// of `assignments`.
pub(crate) fn sale(commission_amount: f64, tip: f64, assignments: &[EmployeeId]) -> Transaction {
    Transaction {
        id: 1,
        date: date!(2025 - 03 - 14),
        customer_id: None,
        service_id: Some(1),
        base_price: 40.0,
        commission_amount,
        tip,
        extras: vec![],
        assignments: assignments.to_vec(),
        employee_id: assignments.first().copied(),
        service_commission: None,
    }
}

#[track_caller]
pub(crate) fn assert_close(left: f64, right: f64) {
    assert!(
        (left - right).abs() < 1e-9,
        "expected {left} to be close to {right}"
    );
}

//! Splits the commission and tip of a sale between the employees who did it.

use serde::Serialize;

use crate::{employee::EmployeeId, transaction::Transaction};

/// The amount of tolerance, in dollars, before a stored commission pool is
/// considered smaller than the service commission recorded with the sale.
const POOL_TOLERANCE: f64 = 0.01;

/// What one employee earned from one sale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attribution {
    pub employee_id: EmployeeId,
    /// The employee's even share of the shared commission pool.
    pub base_share: f64,
    /// The commission of the extras assigned to the employee.
    pub extras_share: f64,
    /// The employee's even share of the tip.
    pub tip_share: f64,
    /// `base_share + extras_share + tip_share`.
    pub total: f64,
}

impl Attribution {
    fn zero(employee_id: EmployeeId) -> Self {
        Self {
            employee_id,
            base_share: 0.0,
            extras_share: 0.0,
            tip_share: 0.0,
            total: 0.0,
        }
    }

    /// The commission earned, excluding the tip.
    pub fn commission(&self) -> f64 {
        self.base_share + self.extras_share
    }
}

/// Whether `employee_id` worked on `transaction`.
///
/// The workers are the employees listed in the assignments. Sales with no
/// assignments were worked by the employee the sale is credited to.
pub fn is_worker(transaction: &Transaction, employee_id: EmployeeId) -> bool {
    if transaction.assignments.is_empty() {
        transaction.employee_id == Some(employee_id)
    } else {
        transaction.assignments.contains(&employee_id)
    }
}

/// The number of employees the shared pool and tip are split between.
pub fn worker_count(transaction: &Transaction) -> usize {
    transaction.assignments.len().max(1)
}

/// Work out what `employee_id` earned from `transaction`.
///
/// Employees who did not work on the sale get zero for everything. Missing or
/// non-finite amounts count as zero, so this never fails.
pub fn attribute(transaction: &Transaction, employee_id: EmployeeId) -> Attribution {
    if !is_worker(transaction, employee_id) {
        return Attribution::zero(employee_id);
    }

    let count = worker_count(transaction) as f64;

    let extras_share: f64 = transaction
        .extras
        .iter()
        .filter(|extra| extra.assigned_to == Some(employee_id))
        .map(|extra| finite_or_zero(extra.commission))
        .sum();

    let assigned_extras_total: f64 = transaction
        .extras
        .iter()
        .filter(|extra| extra.assigned_to.is_some())
        .map(|extra| finite_or_zero(extra.commission))
        .sum();

    let pool = shared_pool(transaction, assigned_extras_total);
    let base_share = pool / count;
    let tip_share = finite_or_zero(transaction.tip) / count;

    Attribution {
        employee_id,
        base_share,
        extras_share,
        tip_share,
        total: base_share + extras_share + tip_share,
    }
}

/// The commission split evenly between every worker.
///
/// The stored amount normally includes the assigned extras, which are taken
/// back out. Some imported rows already left them out, which shows up as a
/// stored amount below the service commission plus assigned extras. Those
/// rows are taken as is.
fn shared_pool(transaction: &Transaction, assigned_extras_total: f64) -> f64 {
    let commission_amount = finite_or_zero(transaction.commission_amount);

    let already_excludes_extras = transaction
        .service_commission
        .filter(|commission| commission.is_finite())
        .is_some_and(|service_commission| {
            let expected = service_commission + assigned_extras_total;
            expected - commission_amount > POOL_TOLERANCE
        });

    if already_excludes_extras {
        commission_amount.max(0.0)
    } else {
        (commission_amount - assigned_extras_total).max(0.0)
    }
}

fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() { amount } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use crate::{
        employee::EmployeeId,
        test_utils::{assert_close, sale},
        transaction::{Extra, Transaction},
    };

    use super::{attribute, is_worker};

    const ALICE: EmployeeId = EmployeeId::new(1);
    const BOB: EmployeeId = EmployeeId::new(2);
    const CAROL: EmployeeId = EmployeeId::new(3);

    fn extra(commission: f64, assigned_to: Option<EmployeeId>) -> Extra {
        Extra {
            description: "Tyre shine".to_owned(),
            price: 10.0,
            commission,
            assigned_to,
        }
    }

    #[test]
    fn two_workers_split_commission_and_tip() {
        let transaction = sale(10.0, 4.0, &[ALICE, BOB]);

        for employee_id in [ALICE, BOB] {
            let attribution = attribute(&transaction, employee_id);

            assert_close(attribution.base_share, 5.0);
            assert_close(attribution.extras_share, 0.0);
            assert_close(attribution.tip_share, 2.0);
            assert_close(attribution.total, 7.0);
        }
    }

    #[test]
    fn shares_reconstruct_totals() {
        let employees: Vec<EmployeeId> = (1..=7).map(EmployeeId::new).collect();

        for n in 1..=employees.len() {
            for (commission, tip) in [(10.0, 4.0), (33.33, 0.0), (0.0, 17.5), (100.0, 3.0)] {
                let workers = &employees[..n];
                let transaction = sale(commission, tip, workers);

                let attributions: Vec<_> = workers
                    .iter()
                    .map(|&employee_id| attribute(&transaction, employee_id))
                    .collect();

                for attribution in &attributions {
                    assert_close(attribution.base_share, commission / n as f64);
                    assert_close(attribution.tip_share, tip / n as f64);
                }

                assert_close(attributions.iter().map(|a| a.base_share).sum(), commission);
                assert_close(attributions.iter().map(|a| a.tip_share).sum(), tip);
            }
        }
    }

    #[test]
    fn non_worker_gets_nothing() {
        let transaction = sale(10.0, 4.0, &[ALICE, BOB]);

        let attribution = attribute(&transaction, CAROL);

        assert_eq!(attribution.employee_id, CAROL);
        assert_eq!(attribution.total, 0.0);
        assert!(!is_worker(&transaction, CAROL));
    }

    #[test]
    fn primary_employee_is_sole_earner_without_assignments() {
        let transaction = Transaction {
            assignments: vec![],
            employee_id: Some(BOB),
            ..sale(12.0, 3.0, &[])
        };

        let attribution = attribute(&transaction, BOB);

        assert_close(attribution.base_share, 12.0);
        assert_close(attribution.tip_share, 3.0);
        assert_close(attribution.total, 15.0);
        assert_eq!(attribute(&transaction, ALICE).total, 0.0);
    }

    #[test]
    fn credited_employee_outside_assignments_gets_nothing() {
        let transaction = Transaction {
            employee_id: Some(CAROL),
            ..sale(10.0, 4.0, &[ALICE, BOB])
        };

        let carol = attribute(&transaction, CAROL);
        let total: f64 = [ALICE, BOB, CAROL]
            .into_iter()
            .map(|employee_id| attribute(&transaction, employee_id).total)
            .sum();

        assert!(!is_worker(&transaction, CAROL));
        assert_eq!(carol.total, 0.0);
        assert_close(attribute(&transaction, ALICE).total, 7.0);
        assert_close(total, 14.0);
    }

    #[test]
    fn assigned_extra_goes_to_assignee_only() {
        let transaction = Transaction {
            extras: vec![extra(3.0, Some(ALICE))],
            ..sale(11.0, 0.0, &[ALICE, BOB])
        };

        let alice = attribute(&transaction, ALICE);
        let bob = attribute(&transaction, BOB);

        assert_close(alice.extras_share, 3.0);
        assert_close(bob.extras_share, 0.0);
        assert_close(alice.base_share, 4.0);
        assert_close(bob.base_share, 4.0);
        assert_close(alice.total + bob.total, 11.0);
    }

    #[test]
    fn unassigned_extra_is_shared() {
        let transaction = Transaction {
            extras: vec![extra(4.0, None)],
            ..sale(12.0, 0.0, &[ALICE, BOB])
        };

        let alice = attribute(&transaction, ALICE);

        assert_close(alice.extras_share, 0.0);
        assert_close(alice.base_share, 6.0);
    }

    #[test]
    fn stored_pool_without_assigned_extras_is_used_as_is() {
        // Imported row: service commission 8, Alice's extra of 3 already left
        // out of the stored amount.
        let transaction = Transaction {
            extras: vec![extra(3.0, Some(ALICE))],
            service_commission: Some(8.0),
            ..sale(8.0, 0.0, &[ALICE, BOB])
        };

        let alice = attribute(&transaction, ALICE);
        let bob = attribute(&transaction, BOB);

        assert_close(alice.base_share, 4.0);
        assert_close(bob.base_share, 4.0);
        assert_close(alice.extras_share, 3.0);
    }

    #[test]
    fn stored_pool_with_assigned_extras_has_them_removed() {
        let transaction = Transaction {
            extras: vec![extra(3.0, Some(ALICE))],
            service_commission: Some(8.0),
            ..sale(11.0, 0.0, &[ALICE, BOB])
        };

        let bob = attribute(&transaction, BOB);

        assert_close(bob.base_share, 4.0);
    }

    #[test]
    fn difference_within_a_cent_is_not_a_correction() {
        let transaction = Transaction {
            extras: vec![extra(3.0, Some(ALICE))],
            service_commission: Some(8.0),
            ..sale(10.995, 0.0, &[ALICE])
        };

        let alice = attribute(&transaction, ALICE);

        assert_close(alice.base_share, 7.995);
    }

    #[test]
    fn pool_never_goes_negative() {
        let transaction = Transaction {
            extras: vec![extra(5.0, Some(ALICE))],
            ..sale(2.0, 0.0, &[ALICE])
        };

        let alice = attribute(&transaction, ALICE);

        assert_eq!(alice.base_share, 0.0);
        assert_close(alice.total, 5.0);
    }

    #[test]
    fn non_finite_amounts_count_as_zero() {
        let transaction = Transaction {
            extras: vec![extra(f64::NAN, Some(ALICE))],
            service_commission: Some(f64::INFINITY),
            ..sale(f64::NAN, f64::INFINITY, &[ALICE, BOB])
        };

        let alice = attribute(&transaction, ALICE);

        assert_eq!(alice.base_share, 0.0);
        assert_eq!(alice.extras_share, 0.0);
        assert_eq!(alice.tip_share, 0.0);
        assert_eq!(alice.total, 0.0);
    }
}

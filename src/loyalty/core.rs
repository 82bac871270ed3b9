//! Coupons earned by returning customers.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    customer::{CustomerId, get_customer},
    transaction::count_customer_visits,
};

/// How many visits earn a customer one free wash coupon.
pub const VISITS_PER_COUPON: i64 = 10;

/// Database identifier for a coupon.
pub type CouponId = i64;

/// A free wash earned through repeat visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coupon {
    pub id: CouponId,
    pub customer_id: CustomerId,
    /// Printed on the coupon, e.g. "WB-12-3".
    pub code: String,
    pub issued_on: Date,
    /// `None` until the coupon is used.
    pub redeemed_on: Option<Date>,
}

impl Coupon {
    pub fn is_redeemed(&self) -> bool {
        self.redeemed_on.is_some()
    }
}

/// The number of coupons a customer has earned but not yet been given.
pub fn available_coupons(visits: i64, issued: i64) -> i64 {
    (visits.max(0) / VISITS_PER_COUPON - issued).max(0)
}

/// The number of visits before the customer earns their next coupon.
pub fn visits_until_next_coupon(visits: i64) -> i64 {
    VISITS_PER_COUPON - visits.max(0) % VISITS_PER_COUPON
}

/// Create the coupon table.
///
/// Coupons are deleted with their customer.
pub fn create_coupon_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS coupon (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL,
            code TEXT NOT NULL UNIQUE,
            issued_on TEXT NOT NULL,
            redeemed_on TEXT,
            FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_coupon_customer ON coupon(customer_id);",
    )?;

    Ok(())
}

fn count_issued_coupons(customer_id: CustomerId, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM coupon WHERE customer_id = ?1",
            [customer_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Give the customer a coupon for their visits so far.
///
/// # Errors
///
/// Returns [Error::InvalidReference] if the customer does not exist and
/// [Error::NotEligibleForCoupon] if every coupon they have earned has already
/// been issued.
pub fn issue_coupon(
    customer_id: CustomerId,
    today: Date,
    connection: &Connection,
) -> Result<Coupon, Error> {
    get_customer(customer_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidReference("customer"),
        error => error,
    })?;

    let visits = count_customer_visits(customer_id, connection)?;
    let issued = count_issued_coupons(customer_id, connection)?;

    if available_coupons(visits, issued) == 0 {
        return Err(Error::NotEligibleForCoupon);
    }

    // Customer IDs are never reused and coupons moved over by a merge keep
    // their old code, so every code with this prefix was counted in `issued`.
    let code = format!("WB-{customer_id}-{}", issued + 1);

    connection.execute(
        "INSERT INTO coupon (customer_id, code, issued_on) VALUES (?1, ?2, ?3)",
        (customer_id, &code, today),
    )?;

    Ok(Coupon {
        id: connection.last_insert_rowid(),
        customer_id,
        code,
        issued_on: today,
        redeemed_on: None,
    })
}

/// Retrieve a coupon by ID.
pub fn get_coupon(id: CouponId, connection: &Connection) -> Result<Coupon, Error> {
    connection
        .prepare(
            "SELECT id, customer_id, code, issued_on, redeemed_on FROM coupon WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve a customer's coupons, oldest first.
pub fn get_coupons_for_customer(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Vec<Coupon>, Error> {
    connection
        .prepare(
            "SELECT id, customer_id, code, issued_on, redeemed_on FROM coupon
            WHERE customer_id = ?1 ORDER BY issued_on ASC, id ASC",
        )?
        .query_map([customer_id], map_row)?
        .map(|maybe_coupon| maybe_coupon.map_err(|error| error.into()))
        .collect()
}

/// Mark a coupon as used.
///
/// # Errors
///
/// Returns [Error::NotFound] if the coupon does not exist and
/// [Error::CouponAlreadyRedeemed] if it has already been used.
pub fn redeem_coupon(id: CouponId, today: Date, connection: &Connection) -> Result<Coupon, Error> {
    let coupon = get_coupon(id, connection)?;

    if coupon.is_redeemed() {
        return Err(Error::CouponAlreadyRedeemed(coupon.code));
    }

    connection.execute(
        "UPDATE coupon SET redeemed_on = ?1 WHERE id = ?2 AND redeemed_on IS NULL",
        (today, id),
    )?;

    Ok(Coupon {
        redeemed_on: Some(today),
        ..coupon
    })
}

fn map_row(row: &Row) -> Result<Coupon, rusqlite::Error> {
    Ok(Coupon {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        code: row.get(2)?,
        issued_on: row.get(3)?,
        redeemed_on: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        customer::{Customer, CustomerBuilder, create_customer, merge_customers},
        employee::Role,
        test_utils::{
            must_create_employee, must_create_service, must_create_transaction, open_test_db,
        },
    };

    use super::{
        available_coupons, get_coupon, get_coupons_for_customer, issue_coupon, redeem_coupon,
        visits_until_next_coupon,
    };

    fn customer_with_visits(visits: usize, connection: &Connection) -> Customer {
        let customer = create_customer(
            CustomerBuilder {
                name: "Jane".to_owned(),
                ..Default::default()
            },
            connection,
        )
        .unwrap();
        let washer = must_create_employee("Aroha", Role::Washer, connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, connection);

        for _ in 0..visits {
            must_create_transaction(
                Some(customer.id),
                service.id,
                washer.id,
                date!(2025 - 02 - 01),
                connection,
            );
        }

        customer
    }

    #[test]
    fn one_coupon_per_ten_visits() {
        assert_eq!(available_coupons(0, 0), 0);
        assert_eq!(available_coupons(9, 0), 0);
        assert_eq!(available_coupons(10, 0), 1);
        assert_eq!(available_coupons(25, 0), 2);
        assert_eq!(available_coupons(25, 2), 0);
        assert_eq!(available_coupons(10, 3), 0);
    }

    #[test]
    fn counts_down_to_next_coupon() {
        assert_eq!(visits_until_next_coupon(0), 10);
        assert_eq!(visits_until_next_coupon(7), 3);
        assert_eq!(visits_until_next_coupon(10), 10);
        assert_eq!(visits_until_next_coupon(19), 1);
    }

    #[test]
    fn issue_coupon_after_ten_visits() {
        let connection = open_test_db();
        let customer = customer_with_visits(10, &connection);

        let coupon = issue_coupon(customer.id, date!(2025 - 02 - 02), &connection).unwrap();

        assert_eq!(coupon.code, format!("WB-{}-1", customer.id));
        assert_eq!(coupon.redeemed_on, None);
        assert_eq!(
            get_coupons_for_customer(customer.id, &connection),
            Ok(vec![coupon])
        );
    }

    #[test]
    fn new_customer_after_merge_gets_fresh_coupon_code() {
        let connection = open_test_db();
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        let new_customer = |name: &str| {
            create_customer(
                CustomerBuilder {
                    name: name.to_owned(),
                    ..Default::default()
                },
                &connection,
            )
            .unwrap()
        };
        let add_visits = |customer: &Customer| {
            for _ in 0..10 {
                must_create_transaction(
                    Some(customer.id),
                    service.id,
                    washer.id,
                    date!(2025 - 02 - 01),
                    &connection,
                );
            }
        };
        let keep = new_customer("Jane Doe");
        let duplicate = new_customer("Jane D");
        add_visits(&duplicate);
        let moved = issue_coupon(duplicate.id, date!(2025 - 02 - 02), &connection).unwrap();
        merge_customers(keep.id, duplicate.id, &connection).unwrap();

        let fresh = new_customer("Tama");
        add_visits(&fresh);
        let coupon = issue_coupon(fresh.id, date!(2025 - 02 - 03), &connection).unwrap();

        assert_ne!(fresh.id, duplicate.id);
        assert_ne!(coupon.code, moved.code);
        assert_eq!(coupon.code, format!("WB-{}-1", fresh.id));
        assert_eq!(get_coupon(moved.id, &connection).unwrap().customer_id, keep.id);
    }

    #[test]
    fn cannot_issue_more_coupons_than_earned() {
        let connection = open_test_db();
        let customer = customer_with_visits(10, &connection);
        issue_coupon(customer.id, date!(2025 - 02 - 02), &connection).unwrap();

        assert_eq!(
            issue_coupon(customer.id, date!(2025 - 02 - 02), &connection),
            Err(Error::NotEligibleForCoupon)
        );
    }

    #[test]
    fn cannot_issue_before_ten_visits() {
        let connection = open_test_db();
        let customer = customer_with_visits(9, &connection);

        assert_eq!(
            issue_coupon(customer.id, date!(2025 - 02 - 02), &connection),
            Err(Error::NotEligibleForCoupon)
        );
    }

    #[test]
    fn cannot_issue_to_missing_customer() {
        let connection = open_test_db();

        assert_eq!(
            issue_coupon(99, date!(2025 - 02 - 02), &connection),
            Err(Error::InvalidReference("customer"))
        );
    }

    #[test]
    fn coupon_can_only_be_redeemed_once() {
        let connection = open_test_db();
        let customer = customer_with_visits(10, &connection);
        let coupon = issue_coupon(customer.id, date!(2025 - 02 - 02), &connection).unwrap();

        let redeemed = redeem_coupon(coupon.id, date!(2025 - 02 - 09), &connection).unwrap();

        assert_eq!(redeemed.redeemed_on, Some(date!(2025 - 02 - 09)));
        assert_eq!(get_coupon(coupon.id, &connection), Ok(redeemed));
        assert_eq!(
            redeem_coupon(coupon.id, date!(2025 - 02 - 10), &connection),
            Err(Error::CouponAlreadyRedeemed(coupon.code))
        );
    }

    #[test]
    fn redeeming_missing_coupon_fails() {
        let connection = open_test_db();

        assert_eq!(
            redeem_coupon(1, date!(2025 - 02 - 10), &connection),
            Err(Error::NotFound)
        );
    }
}

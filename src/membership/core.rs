//! Defines the membership model and its database queries.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::Date;

use crate::{Error, customer::CustomerId};

/// Database identifier for a membership.
pub type MembershipId = i64;

/// A monthly wash plan a customer subscribes to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Membership {
    pub id: MembershipId,
    pub customer_id: CustomerId,
    /// The name of the plan, e.g. "Unlimited Express".
    pub plan: String,
    pub monthly_price: f64,
    pub start_date: Date,
    /// The last day of the membership, `None` while it runs indefinitely.
    pub end_date: Option<Date>,
}

impl Membership {
    /// Whether the membership covers `date`. Both the start and end date are
    /// included.
    pub fn is_active_on(&self, date: Date) -> bool {
        self.start_date <= date && self.end_date.is_none_or(|end_date| date <= end_date)
    }
}

/// The details needed to sign a customer up with [create_membership].
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipBuilder {
    pub customer_id: CustomerId,
    pub plan: String,
    pub monthly_price: f64,
    pub start_date: Date,
}

/// Create the membership table.
///
/// Memberships are deleted with their customer.
pub fn create_membership_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS membership (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL,
            plan TEXT NOT NULL,
            monthly_price REAL NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_membership_customer ON membership(customer_id);",
    )?;

    Ok(())
}

/// Sign a customer up for a membership.
///
/// # Errors
///
/// Returns [Error::EmptyName] if the plan is blank, [Error::InvalidAmount]
/// if the price is negative or not a number, or [Error::InvalidReference] if
/// the customer does not exist.
pub fn create_membership(
    builder: MembershipBuilder,
    connection: &Connection,
) -> Result<Membership, Error> {
    let plan = builder.plan.trim().to_owned();
    if plan.is_empty() {
        return Err(Error::EmptyName("Plan"));
    }

    if !builder.monthly_price.is_finite() || builder.monthly_price < 0.0 {
        return Err(Error::InvalidAmount("Monthly price"));
    }

    connection
        .execute(
            "INSERT INTO membership (customer_id, plan, monthly_price, start_date)
            VALUES (?1, ?2, ?3, ?4)",
            (
                builder.customer_id,
                &plan,
                builder.monthly_price,
                builder.start_date,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidReference("customer"),
            error => error.into(),
        })?;

    Ok(Membership {
        id: connection.last_insert_rowid(),
        customer_id: builder.customer_id,
        plan,
        monthly_price: builder.monthly_price,
        start_date: builder.start_date,
        end_date: None,
    })
}

const SELECT_MEMBERSHIP: &str =
    "SELECT id, customer_id, plan, monthly_price, start_date, end_date FROM membership";

/// Retrieve a membership by ID.
pub fn get_membership(id: MembershipId, connection: &Connection) -> Result<Membership, Error> {
    connection
        .prepare(&format!("{SELECT_MEMBERSHIP} WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve a customer's memberships, newest first.
pub fn get_memberships_for_customer(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Vec<Membership>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_MEMBERSHIP} WHERE customer_id = ?1 ORDER BY start_date DESC, id DESC"
        ))?
        .query_map([customer_id], map_row)?
        .map(|maybe_membership| maybe_membership.map_err(|error| error.into()))
        .collect()
}

/// Retrieve every membership, newest first.
pub fn get_all_memberships(connection: &Connection) -> Result<Vec<Membership>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_MEMBERSHIP} ORDER BY start_date DESC, id DESC"
        ))?
        .query_map([], map_row)?
        .map(|maybe_membership| maybe_membership.map_err(|error| error.into()))
        .collect()
}

/// End a membership today.
///
/// A membership that has not started yet is ended the day before it starts,
/// so it never becomes active.
///
/// # Errors
///
/// Returns [Error::NotFound] if the membership does not exist and
/// [Error::MembershipAlreadyEnded] if it already has an end date.
pub fn cancel_membership(
    id: MembershipId,
    today: Date,
    connection: &Connection,
) -> Result<Membership, Error> {
    let membership = get_membership(id, connection)?;

    if membership.end_date.is_some() {
        return Err(Error::MembershipAlreadyEnded);
    }

    let end_date = if today < membership.start_date {
        membership
            .start_date
            .previous_day()
            .unwrap_or(membership.start_date)
    } else {
        today
    };

    connection.execute(
        "UPDATE membership SET end_date = ?1 WHERE id = ?2",
        (end_date, id),
    )?;

    Ok(Membership {
        end_date: Some(end_date),
        ..membership
    })
}

fn map_row(row: &Row) -> Result<Membership, rusqlite::Error> {
    Ok(Membership {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        plan: row.get(2)?,
        monthly_price: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
    })
}

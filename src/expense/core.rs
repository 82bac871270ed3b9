//! Defines the expense model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, date_range::DateRange, employee::EmployeeId};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// Money spent by the business or on behalf of an employee.
///
/// Expenses that belong to an employee are taken off their net earnings in
/// the commission report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub date: Date,
    pub amount: f64,
    pub description: String,
    /// `None` for business expenses that no employee pays for.
    pub employee_id: Option<EmployeeId>,
}

/// The fields needed to record an [Expense].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    pub date: Date,
    pub amount: f64,
    pub description: String,
    pub employee_id: Option<EmployeeId>,
}

/// Create the expense table.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            employee_id INTEGER,
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON UPDATE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

/// Record an expense.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if the amount is negative or not a number,
/// [Error::EmptyName] if the description is blank, or
/// [Error::InvalidReference] if the employee does not exist.
pub fn create_expense(builder: ExpenseBuilder, connection: &Connection) -> Result<Expense, Error> {
    if !builder.amount.is_finite() || builder.amount < 0.0 {
        return Err(Error::InvalidAmount("Amount"));
    }

    let description = builder.description.trim().to_owned();
    if description.is_empty() {
        return Err(Error::EmptyName("Expense description"));
    }

    connection
        .execute(
            "INSERT INTO expense (date, amount, description, employee_id) VALUES (?1, ?2, ?3, ?4)",
            (
                builder.date,
                builder.amount,
                &description,
                builder.employee_id.map(|employee_id| employee_id.as_i64()),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidReference("employee"),
            error => error.into(),
        })?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        date: builder.date,
        amount: builder.amount,
        description,
        employee_id: builder.employee_id,
    })
}

/// Retrieve an expense by ID.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare("SELECT id, date, amount, description, employee_id FROM expense WHERE id = :id")?
        .query_row(&[(":id", &id)], map_expense_row)
        .map_err(|error| error.into())
}

/// Retrieve the expenses dated within `range`, newest first.
pub fn get_expenses_in_range(
    range: &DateRange,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, date, amount, description, employee_id FROM expense
            WHERE date BETWEEN ?1 AND ?2
            ORDER BY date DESC, id DESC",
        )?
        .query_map((range.start, range.end), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Delete an expense.
///
/// # Errors
///
/// Returns [Error::DeleteMissing] if the expense does not exist.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing("expense"));
    }

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let employee_id: Option<i64> = row.get(4)?;

    Ok(Expense {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        employee_id: employee_id.map(EmployeeId::new),
    })
}

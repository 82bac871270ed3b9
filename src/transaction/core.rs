//! Defines the core data models and database queries for transactions.

use std::collections::HashMap;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    customer::{CustomerId, get_customer},
    date_range::DateRange,
    employee::{EmployeeId, get_employee},
    service::{ServiceId, get_service},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// A sale: one service done for a customer, by one or more employees, plus
/// any extras added on at the counter.
///
/// To create a new `Transaction`, use [TransactionBuilder] and
/// [create_transaction]. Transactions are not edited after they are created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The calendar day of the sale in the business timezone.
    pub date: Date,
    /// The customer, if known. Walk-ins and deleted customers have none.
    pub customer_id: Option<CustomerId>,
    /// The service sold, if known.
    pub service_id: Option<ServiceId>,
    /// The price of the service when it was sold.
    pub base_price: f64,
    /// The total commission pool recorded for the sale.
    ///
    /// Sales recorded by this app store the service commission plus the
    /// commission of every extra. Imported rows may already have the assigned
    /// extras taken out.
    pub commission_amount: f64,
    /// The tip left by the customer, shared by everyone who worked on the car.
    pub tip: f64,
    /// Add-ons sold with the service, e.g. "Tyre shine".
    pub extras: Vec<Extra>,
    /// The employees who did the work, in the order they were entered.
    pub assignments: Vec<EmployeeId>,
    /// The employee credited with the sale.
    ///
    /// If `assignments` is empty, this employee is the only one who earns
    /// from the sale.
    pub employee_id: Option<EmployeeId>,
    /// The commission the catalog listed for the service when it was sold.
    ///
    /// Imported rows may not have one.
    pub service_commission: Option<f64>,
}

impl Transaction {
    /// What the customer paid, excluding the tip.
    pub fn revenue(&self) -> f64 {
        self.base_price + self.extras.iter().map(|extra| extra.price).sum::<f64>()
    }
}

/// An add-on sold with a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    pub description: String,
    pub price: f64,
    pub commission: f64,
    /// The employee who did the extra and earns all of its commission.
    /// Unassigned extras go into the shared commission pool.
    pub assigned_to: Option<EmployeeId>,
}

/// The details of a sale to record with [create_transaction].
///
/// The price and commission come from the service in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The day of the sale. Must not be in the future, which the caller checks
    /// against the business timezone.
    pub date: Date,
    pub customer_id: Option<CustomerId>,
    pub service_id: ServiceId,
    pub tip: f64,
    /// Must have at least one employee. The first is credited with the sale.
    pub assignments: Vec<EmployeeId>,
    pub extras: Vec<Extra>,
}

impl TransactionBuilder {
    /// Check the amounts and people on the sale.
    ///
    /// Returns the builder with duplicate assignments removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::NoEmployeesAssigned], [Error::InvalidAmount] or
    /// [Error::ExtraAssigneeNotWorking].
    pub fn validate(self) -> Result<Self, Error> {
        let mut assignments: Vec<EmployeeId> = Vec::with_capacity(self.assignments.len());
        for employee_id in self.assignments {
            if !assignments.contains(&employee_id) {
                assignments.push(employee_id);
            }
        }

        if assignments.is_empty() {
            return Err(Error::NoEmployeesAssigned);
        }

        if !self.tip.is_finite() || self.tip < 0.0 {
            return Err(Error::InvalidAmount("Tip"));
        }

        for extra in &self.extras {
            if !extra.price.is_finite() || extra.price < 0.0 {
                return Err(Error::InvalidAmount("Extra price"));
            }

            if !extra.commission.is_finite() || extra.commission < 0.0 {
                return Err(Error::InvalidAmount("Extra commission"));
            }

            if let Some(assigned_to) = extra.assigned_to
                && !assignments.contains(&assigned_to)
            {
                return Err(Error::ExtraAssigneeNotWorking);
            }
        }

        Ok(Self {
            assignments,
            ..self
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table and the tables for its assignments and extras.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            customer_id INTEGER,
            service_id INTEGER,
            base_price REAL NOT NULL DEFAULT 0,
            commission_amount REAL NOT NULL DEFAULT 0,
            tip REAL NOT NULL DEFAULT 0,
            employee_id INTEGER,
            service_commission REAL,
            FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE SET NULL,
            FOREIGN KEY(service_id) REFERENCES service(id) ON UPDATE CASCADE,
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON UPDATE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);
        CREATE INDEX IF NOT EXISTS idx_transaction_customer ON \"transaction\"(customer_id);

        CREATE TABLE IF NOT EXISTS transaction_assignment (
            transaction_id INTEGER NOT NULL,
            employee_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY(transaction_id, employee_id),
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON UPDATE CASCADE
        );

        CREATE TABLE IF NOT EXISTS transaction_extra (
            id INTEGER PRIMARY KEY,
            transaction_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            price REAL NOT NULL DEFAULT 0,
            commission REAL NOT NULL DEFAULT 0,
            assigned_to INTEGER,
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(assigned_to) REFERENCES employee(id) ON UPDATE CASCADE
        );",
    )?;

    Ok(())
}

/// Record a sale.
///
/// The base price and commissions are copied from the service so that later
/// catalog changes do not rewrite history. The stored commission pool is the
/// service commission plus the commission of every extra, and the first
/// assigned employee is credited with the sale.
///
/// # Errors
/// This function will return a:
/// - validation error from [TransactionBuilder::validate],
/// - [Error::InvalidReference] if the service, customer or an employee does not exist,
/// - [Error::ServiceInactive] if the service is no longer sold,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;

    let service = get_service(builder.service_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidReference("service"),
        error => error,
    })?;

    if !service.active {
        return Err(Error::ServiceInactive(service.name));
    }

    if let Some(customer_id) = builder.customer_id {
        get_customer(customer_id, connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidReference("customer"),
            error => error,
        })?;
    }

    for employee_id in &builder.assignments {
        get_employee(*employee_id, connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidReference("employee"),
            error => error,
        })?;
    }

    let extras_commission: f64 = builder.extras.iter().map(|extra| extra.commission).sum();
    let commission_amount = service.commission + extras_commission;
    let primary_employee = builder.assignments.first().copied();

    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO \"transaction\"
            (date, customer_id, service_id, base_price, commission_amount, tip, employee_id,
            service_commission)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            builder.date,
            builder.customer_id,
            service.id,
            service.price,
            commission_amount,
            builder.tip,
            primary_employee.map(|employee_id| employee_id.as_i64()),
            service.commission,
        ),
    )?;

    let id = transaction.last_insert_rowid();

    for (position, employee_id) in builder.assignments.iter().enumerate() {
        transaction.execute(
            "INSERT INTO transaction_assignment (transaction_id, employee_id, position)
            VALUES (?1, ?2, ?3)",
            (id, employee_id.as_i64(), position as i64),
        )?;
    }

    for extra in &builder.extras {
        transaction.execute(
            "INSERT INTO transaction_extra
                (transaction_id, description, price, commission, assigned_to)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                id,
                &extra.description,
                extra.price,
                extra.commission,
                extra.assigned_to.map(|employee_id| employee_id.as_i64()),
            ),
        )?;
    }

    transaction.commit()?;

    Ok(Transaction {
        id,
        date: builder.date,
        customer_id: builder.customer_id,
        service_id: Some(service.id),
        base_price: service.price,
        commission_amount,
        tip: builder.tip,
        extras: builder.extras,
        assignments: builder.assignments,
        employee_id: primary_employee,
        service_commission: Some(service.commission),
    })
}

const SELECT_TRANSACTION: &str = "SELECT t.id, t.date, t.customer_id, t.service_id, t.base_price,
        t.commission_amount, t.tip, t.employee_id, t.service_commission
    FROM \"transaction\" t";

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let mut transaction = connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE t.id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    transaction.assignments = connection
        .prepare(
            "SELECT employee_id FROM transaction_assignment
            WHERE transaction_id = :id ORDER BY position ASC",
        )?
        .query_map(&[(":id", &id)], |row| row.get(0).map(EmployeeId::new))?
        .collect::<Result<_, _>>()?;

    transaction.extras = connection
        .prepare(
            "SELECT description, price, commission, assigned_to FROM transaction_extra
            WHERE transaction_id = :id ORDER BY id ASC",
        )?
        .query_map(&[(":id", &id)], map_extra_row)?
        .collect::<Result<_, _>>()?;

    Ok(transaction)
}

/// Retrieve the transactions dated within `range`, newest first, with their
/// assignments and extras.
pub fn get_transactions_in_range(
    range: &DateRange,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions: Vec<Transaction> = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.date BETWEEN ?1 AND ?2 ORDER BY t.date DESC, t.id DESC"
        ))?
        .query_map((range.start, range.end), map_transaction_row)?
        .collect::<Result<_, _>>()?;

    let mut assignments: HashMap<TransactionId, Vec<EmployeeId>> = HashMap::new();
    let mut assignment_statement = connection.prepare(
        "SELECT a.transaction_id, a.employee_id FROM transaction_assignment a
        INNER JOIN \"transaction\" t ON t.id = a.transaction_id
        WHERE t.date BETWEEN ?1 AND ?2
        ORDER BY a.transaction_id ASC, a.position ASC",
    )?;
    let assignment_rows = assignment_statement.query_map((range.start, range.end), |row| {
        Ok((row.get::<_, TransactionId>(0)?, EmployeeId::new(row.get(1)?)))
    })?;
    for row in assignment_rows {
        let (transaction_id, employee_id) = row?;
        assignments.entry(transaction_id).or_default().push(employee_id);
    }

    let mut extras: HashMap<TransactionId, Vec<Extra>> = HashMap::new();
    let mut extra_statement = connection.prepare(
        "SELECT e.transaction_id, e.description, e.price, e.commission, e.assigned_to
        FROM transaction_extra e
        INNER JOIN \"transaction\" t ON t.id = e.transaction_id
        WHERE t.date BETWEEN ?1 AND ?2
        ORDER BY e.id ASC",
    )?;
    let extra_rows = extra_statement.query_map((range.start, range.end), |row| {
        let transaction_id: TransactionId = row.get(0)?;
        let assigned_to: Option<i64> = row.get(4)?;

        Ok((
            transaction_id,
            Extra {
                description: row.get(1)?,
                price: row.get(2)?,
                commission: row.get(3)?,
                assigned_to: assigned_to.map(EmployeeId::new),
            },
        ))
    })?;
    for row in extra_rows {
        let (transaction_id, extra) = row?;
        extras.entry(transaction_id).or_default().push(extra);
    }

    for transaction in &mut transactions {
        transaction.assignments = assignments.remove(&transaction.id).unwrap_or_default();
        transaction.extras = extras.remove(&transaction.id).unwrap_or_default();
    }

    Ok(transactions)
}

/// The number of visits a customer has made, i.e. their number of transactions.
pub fn count_customer_visits(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE customer_id = ?1",
            [customer_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Delete a transaction along with its assignments and extras.
///
/// # Errors
///
/// Returns [Error::DeleteMissing] if the transaction does not exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing("transaction"));
    }

    Ok(())
}

/// Map a row selected with `SELECT_TRANSACTION` to a transaction without its
/// assignments and extras.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let employee_id: Option<i64> = row.get(7)?;

    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        customer_id: row.get(2)?,
        service_id: row.get(3)?,
        base_price: row.get(4)?,
        commission_amount: row.get(5)?,
        tip: row.get(6)?,
        extras: Vec::new(),
        assignments: Vec::new(),
        employee_id: employee_id.map(EmployeeId::new),
        service_commission: row.get(8)?,
    })
}

fn map_extra_row(row: &Row) -> Result<Extra, rusqlite::Error> {
    let assigned_to: Option<i64> = row.get(3)?;

    Ok(Extra {
        description: row.get(0)?,
        price: row.get(1)?,
        commission: row.get(2)?,
        assigned_to: assigned_to.map(EmployeeId::new),
    })
}

// ============================================================================
// TESTS
// ============================================================================

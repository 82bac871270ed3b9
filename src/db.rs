//! Sets up the application's SQLite database.

use rusqlite::Connection;

use crate::{
    Error,
    customer::{create_customer_table, create_vehicle_table},
    employee::create_employee_table,
    expense::create_expense_table,
    loyalty::create_coupon_table,
    membership::create_membership_table,
    service::create_service_table,
    transaction::create_transaction_tables,
};

/// Create all of the tables used by the application.
///
/// Tables are created in dependency order so that foreign keys always refer
/// to an existing table. Foreign key enforcement is switched on for
/// `connection`, since SQLite leaves it off by default.
///
/// Calling this on an already initialized database is a no-op.
///
/// # Errors
/// Returns an [Error::SqlError] if any table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = connection.unchecked_transaction()?;

    create_employee_table(&transaction)?;
    create_service_table(&transaction)?;
    create_customer_table(&transaction)?;
    create_vehicle_table(&transaction)?;
    create_transaction_tables(&transaction)?;
    create_expense_table(&transaction)?;
    create_coupon_table(&transaction)?;
    create_membership_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

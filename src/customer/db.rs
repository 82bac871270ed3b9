//! Database operations for customers and their vehicles.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    customer::{Customer, CustomerBuilder, CustomerId, Vehicle, VehicleFormData, digits_only},
};

/// Create the customer table.
pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS customer (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_customer_name ON customer(name);",
    )?;

    Ok(())
}

/// Create the vehicle table. Vehicles are deleted along with their owner.
pub fn create_vehicle_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS vehicle (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL,
            make TEXT NOT NULL DEFAULT '',
            model TEXT NOT NULL DEFAULT '',
            colour TEXT NOT NULL DEFAULT '',
            plate TEXT NOT NULL,
            FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_vehicle_customer ON vehicle(customer_id);",
    )?;

    Ok(())
}

/// Validate `builder` and add the customer.
pub fn create_customer(
    builder: CustomerBuilder,
    connection: &Connection,
) -> Result<Customer, Error> {
    let builder = builder.validate()?;

    connection.execute(
        "INSERT INTO customer (name, phone, email, notes) VALUES (?1, ?2, ?3, ?4)",
        (&builder.name, &builder.phone, &builder.email, &builder.notes),
    )?;

    Ok(Customer {
        id: connection.last_insert_rowid(),
        name: builder.name,
        phone: builder.phone,
        email: builder.email,
        notes: builder.notes,
    })
}

/// Retrieve a customer by ID.
pub fn get_customer(id: CustomerId, connection: &Connection) -> Result<Customer, Error> {
    connection
        .prepare("SELECT id, name, phone, email, notes FROM customer WHERE id = :id")?
        .query_row(&[(":id", &id)], map_customer_row)
        .map_err(|error| error.into())
}

/// Retrieve every customer ordered by name, ignoring case, then by ID.
pub fn get_all_customers(connection: &Connection) -> Result<Vec<Customer>, Error> {
    connection
        .prepare(
            "SELECT id, name, phone, email, notes FROM customer
            ORDER BY name COLLATE NOCASE ASC, id ASC",
        )?
        .query_map([], map_customer_row)?
        .map(|maybe_customer| maybe_customer.map_err(|error| error.into()))
        .collect()
}

/// Find the customers whose phone number has the same digits as `phone`.
///
/// Returns an empty list if `phone` has no digits.
pub fn get_customers_by_phone(phone: &str, connection: &Connection) -> Result<Vec<Customer>, Error> {
    let digits = digits_only(phone);

    if digits.is_empty() {
        return Ok(Vec::new());
    }

    let customers = get_all_customers(connection)?
        .into_iter()
        .filter(|customer| digits_only(&customer.phone) == digits)
        .collect();

    Ok(customers)
}

/// Delete a customer along with their vehicles, coupons and memberships.
///
/// Their transactions are kept for the commission history, without a customer.
///
/// # Errors
///
/// Returns [Error::DeleteMissing] if the customer does not exist.
pub fn delete_customer(id: CustomerId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM customer WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing("customer"));
    }

    Ok(())
}

/// Validate `vehicle` and add it to the customer's vehicles.
///
/// # Errors
///
/// Returns [Error::InvalidReference] if the customer does not exist.
pub fn create_vehicle(
    customer_id: CustomerId,
    vehicle: VehicleFormData,
    connection: &Connection,
) -> Result<Vehicle, Error> {
    let vehicle = vehicle.validate()?;

    connection
        .execute(
            "INSERT INTO vehicle (customer_id, make, model, colour, plate)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                customer_id,
                &vehicle.make,
                &vehicle.model,
                &vehicle.colour,
                &vehicle.plate,
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

    Ok(Vehicle {
        id: connection.last_insert_rowid(),
        customer_id,
        make: vehicle.make,
        model: vehicle.model,
        colour: vehicle.colour,
        plate: vehicle.plate,
    })
}

/// Retrieve a customer's vehicles in the order they were added.
pub fn get_vehicles_for_customer(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Vec<Vehicle>, Error> {
    connection
        .prepare(
            "SELECT id, customer_id, make, model, colour, plate FROM vehicle
            WHERE customer_id = :customer_id ORDER BY id ASC",
        )?
        .query_map(&[(":customer_id", &customer_id)], map_vehicle_row)?
        .map(|maybe_vehicle| maybe_vehicle.map_err(|error| error.into()))
        .collect()
}

/// Retrieve every vehicle.
pub fn get_all_vehicles(connection: &Connection) -> Result<Vec<Vehicle>, Error> {
    connection
        .prepare("SELECT id, customer_id, make, model, colour, plate FROM vehicle ORDER BY id ASC")?
        .query_map([], map_vehicle_row)?
        .map(|maybe_vehicle| maybe_vehicle.map_err(|error| error.into()))
        .collect()
}

fn map_customer_row(row: &Row) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        notes: row.get(4)?,
    })
}

fn map_vehicle_row(row: &Row) -> Result<Vehicle, rusqlite::Error> {
    Ok(Vehicle {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        make: row.get(2)?,
        model: row.get(3)?,
        colour: row.get(4)?,
        plate: row.get(5)?,
    })
}

//! Database operations for the service catalog.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    service::{Service, ServiceBuilder, ServiceId},
};

/// Create the service table.
pub fn create_service_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS service (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            commission REAL NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_service_name ON service(name);",
    )?;

    Ok(())
}

/// Validate `builder` and add the service to the catalog.
///
/// # Errors
///
/// Returns a validation error from [ServiceBuilder::validate], or
/// [Error::SqlError] if the insert failed.
pub fn create_service(builder: ServiceBuilder, connection: &Connection) -> Result<Service, Error> {
    let builder = builder.validate()?;

    connection.execute(
        "INSERT INTO service (name, price, commission, active) VALUES (?1, ?2, ?3, ?4)",
        (
            &builder.name,
            builder.price,
            builder.commission,
            builder.active,
        ),
    )?;

    Ok(Service {
        id: connection.last_insert_rowid(),
        name: builder.name,
        price: builder.price,
        commission: builder.commission,
        active: builder.active,
    })
}

/// Retrieve a single service by ID.
pub fn get_service(id: ServiceId, connection: &Connection) -> Result<Service, Error> {
    connection
        .prepare("SELECT id, name, price, commission, active FROM service WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the whole catalog, active services first, then by name.
pub fn get_all_services(connection: &Connection) -> Result<Vec<Service>, Error> {
    connection
        .prepare(
            "SELECT id, name, price, commission, active FROM service
            ORDER BY active DESC, name ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_service| maybe_service.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the services that can currently be sold, ordered by name.
pub fn get_active_services(connection: &Connection) -> Result<Vec<Service>, Error> {
    connection
        .prepare(
            "SELECT id, name, price, commission, active FROM service
            WHERE active = 1 ORDER BY name ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_service| maybe_service.map_err(|error| error.into()))
        .collect()
}

/// Validate `builder` and overwrite the service with it.
///
/// Changing the price or commission does not affect past transactions, which
/// keep the amounts they were sold for.
///
/// # Errors
///
/// Returns [Error::UpdateMissing] if the service does not exist.
pub fn update_service(
    id: ServiceId,
    builder: ServiceBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let builder = builder.validate()?;

    let rows_affected = connection.execute(
        "UPDATE service SET name = ?1, price = ?2, commission = ?3, active = ?4 WHERE id = ?5",
        (
            &builder.name,
            builder.price,
            builder.commission,
            builder.active,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing("service"));
    }

    Ok(())
}

/// Remove a service from the catalog.
///
/// # Errors
///
/// Returns [Error::DeleteMissing] if the service does not exist, and
/// [Error::InUse] if a transaction refers to it. Such services should be
/// deactivated instead.
pub fn delete_service(id: ServiceId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute("DELETE FROM service WHERE id = ?1", [id])
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InUse("service"),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing("service"));
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Service, rusqlite::Error> {
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        commission: row.get(3)?,
        active: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        commission::aggregate,
        date_range::DateRange,
        employee::Role,
        service::{ServiceBuilder, create_service, get_active_services, get_all_services, get_service},
        test_utils::{assert_close, must_create_employee, must_create_service, open_test_db},
        transaction::{Extra, TransactionBuilder, create_transaction, get_transactions_in_range},
    };

    use super::{delete_service, update_service};

    #[test]
    fn create_service_succeeds() {
        let connection = open_test_db();

        let service = create_service(
            ServiceBuilder {
                name: "Express Wash".to_owned(),
                price: 25.0,
                commission: 8.0,
                active: true,
            },
            &connection,
        )
        .unwrap();

        assert!(service.id > 0);
        assert_eq!(get_service(service.id, &connection), Ok(service));
    }

    #[test]
    fn create_service_validates() {
        let connection = open_test_db();

        let result = create_service(
            ServiceBuilder {
                name: String::new(),
                price: 25.0,
                commission: 8.0,
                active: true,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::EmptyName("Service")));
    }

    #[test]
    fn inactive_services_are_hidden_from_sale() {
        let connection = open_test_db();
        let express = must_create_service("Express Wash", 25.0, 8.0, &connection);
        let detail = must_create_service("Full Detail", 180.0, 60.0, &connection);
        update_service(
            detail.id,
            ServiceBuilder {
                name: detail.name.clone(),
                price: detail.price,
                commission: detail.commission,
                active: false,
            },
            &connection,
        )
        .unwrap();

        let active = get_active_services(&connection).unwrap();
        let all = get_all_services(&connection).unwrap();

        assert_eq!(active, vec![express.clone()]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], express);
    }

    #[test]
    fn update_missing_service_fails() {
        let connection = open_test_db();

        let result = update_service(
            7,
            ServiceBuilder {
                name: "Ghost".to_owned(),
                price: 1.0,
                commission: 0.0,
                active: true,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissing("service")));
    }

    #[test]
    fn catalog_commission_change_keeps_past_earnings() {
        let connection = open_test_db();
        let alice = must_create_employee("Alice", Role::Washer, &connection);
        let bob = must_create_employee("Bob", Role::Washer, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        create_transaction(
            TransactionBuilder {
                date: date!(2025 - 03 - 14),
                customer_id: None,
                service_id: service.id,
                tip: 0.0,
                assignments: vec![alice.id, bob.id],
                extras: vec![Extra {
                    description: "Tyre shine".to_owned(),
                    price: 6.0,
                    commission: 3.0,
                    assigned_to: Some(alice.id),
                }],
            },
            &connection,
        )
        .unwrap();
        let range = DateRange::month_of(date!(2025 - 03 - 14));
        let before = get_transactions_in_range(&range, &connection).unwrap();

        update_service(
            service.id,
            ServiceBuilder {
                name: "Express Wash".to_owned(),
                price: 30.0,
                commission: 10.0,
                active: true,
            },
            &connection,
        )
        .unwrap();
        let after = get_transactions_in_range(&range, &connection).unwrap();

        assert_eq!(after, before);
        assert_eq!(after[0].service_commission, Some(8.0));
        let alice_before = aggregate(&before, &[], alice.id, &range);
        let alice_after = aggregate(&after, &[], alice.id, &range);
        let bob_after = aggregate(&after, &[], bob.id, &range);
        assert_close(alice_before.commission, 7.0);
        assert_close(alice_after.commission, alice_before.commission);
        assert_close(bob_after.commission, 4.0);
        assert_close(alice_after.commission + bob_after.commission, 11.0);
    }

    #[test]
    fn delete_unused_service_succeeds() {
        let connection = open_test_db();
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);

        delete_service(service.id, &connection).unwrap();

        assert_eq!(get_service(service.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_sold_service_is_rejected() {
        let connection = open_test_db();
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        connection
            .execute(
                "INSERT INTO \"transaction\" (date, service_id, base_price, commission_amount, tip)
                VALUES ('2025-01-01', ?1, 25.0, 8.0, 0.0)",
                [service.id],
            )
            .unwrap();

        assert_eq!(
            delete_service(service.id, &connection),
            Err(Error::InUse("service"))
        );
    }

    #[test]
    fn delete_missing_service_fails() {
        let connection = open_test_db();

        assert_eq!(
            delete_service(1, &connection),
            Err(Error::DeleteMissing("service"))
        );
    }
}

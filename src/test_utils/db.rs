use rusqlite::Connection;
use time::Date;

use crate::{
    auth::PasswordHash,
    customer::CustomerId,
    db::initialize,
    employee::{Employee, EmployeeId, EmployeeName, Role, create_employee},
    service::{Service, ServiceBuilder, ServiceId, create_service},
    transaction::{Transaction, TransactionBuilder, create_transaction},
};

/// An in-memory database with every table created and foreign keys enforced.
#[track_caller]
pub(crate) fn open_test_db() -> Connection {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    initialize(&connection).expect("could not initialize database");
    connection
}

#[track_caller]
pub(crate) fn must_create_employee(name: &str, role: Role, connection: &Connection) -> Employee {
    create_employee(
        EmployeeName::new(name).expect("invalid employee name"),
        role,
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("could not create employee")
}

#[track_caller]
pub(crate) fn must_create_service(
    name: &str,
    price: f64,
    commission: f64,
    connection: &Connection,
) -> Service {
    create_service(
        ServiceBuilder {
            name: name.to_owned(),
            price,
            commission,
            active: true,
        },
        connection,
    )
    .expect("could not create service")
}

/// Record a sale of `service_id` by a single employee with no tip or extras.
#[track_caller]
pub(crate) fn must_create_transaction(
    customer_id: Option<CustomerId>,
    service_id: ServiceId,
    employee_id: EmployeeId,
    date: Date,
    connection: &Connection,
) -> Transaction {
    create_transaction(
        TransactionBuilder {
            date,
            customer_id,
            service_id,
            tip: 0.0,
            assignments: vec![employee_id],
            extras: vec![],
        },
        connection,
    )
    .expect("could not create transaction")
}

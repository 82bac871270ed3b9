//! Database operations for employees.

use std::str::FromStr;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::PasswordHash,
    employee::{Employee, EmployeeId, EmployeeName, Role},
};

/// Create the employee table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_employee_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS employee (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL CHECK (role IN ('admin', 'manager', 'washer')),
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new employee into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmployeeName] if another employee already has
/// `name`, or [Error::SqlError] for any other SQL error.
pub fn create_employee(
    name: EmployeeName,
    role: Role,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<Employee, Error> {
    connection
        .execute(
            "INSERT INTO employee (name, role, password) VALUES (?1, ?2, ?3)",
            (name.as_ref(), role.as_str(), password_hash.as_ref()),
        )
        .map_err(|error| map_unique_name_error(error, &name))?;

    let id = EmployeeId::new(connection.last_insert_rowid());

    Ok(Employee {
        id,
        name,
        role,
        password_hash,
    })
}

/// Get the employee with the given `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such employee.
pub fn get_employee(id: EmployeeId, connection: &Connection) -> Result<Employee, Error> {
    connection
        .prepare("SELECT id, name, role, password FROM employee WHERE id = :id")?
        .query_row(&[(":id", &id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the employee who logs in with `name`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such employee.
pub fn get_employee_by_name(name: &str, connection: &Connection) -> Result<Employee, Error> {
    connection
        .prepare("SELECT id, name, role, password FROM employee WHERE name = :name")?
        .query_row(&[(":name", &name.trim())], map_row)
        .map_err(|error| error.into())
}

/// Get every employee ordered alphabetically by name.
pub fn get_all_employees(connection: &Connection) -> Result<Vec<Employee>, Error> {
    connection
        .prepare("SELECT id, name, role, password FROM employee ORDER BY name ASC")?
        .query_map([], map_row)?
        .map(|maybe_employee| maybe_employee.map_err(|error| error.into()))
        .collect()
}

/// Change an employee's name and role.
///
/// # Errors
///
/// Returns [Error::UpdateMissing] if the employee does not exist and
/// [Error::DuplicateEmployeeName] if the new name is taken.
pub fn update_employee(
    id: EmployeeId,
    name: &EmployeeName,
    role: Role,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE employee SET name = ?1, role = ?2 WHERE id = ?3",
            (name.as_ref(), role.as_str(), id.as_i64()),
        )
        .map_err(|error| map_unique_name_error(error, name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing("employee"));
    }

    Ok(())
}

/// Replace an employee's password hash.
///
/// # Errors
///
/// Returns [Error::UpdateMissing] if the employee does not exist.
pub fn update_employee_password(
    id: EmployeeId,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE employee SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing("employee"));
    }

    Ok(())
}

/// Delete an employee.
///
/// Employees who appear in the sales history cannot be deleted.
///
/// # Errors
///
/// Returns [Error::DeleteMissing] if the employee does not exist and
/// [Error::InUse] if a transaction refers to them.
pub fn delete_employee(id: EmployeeId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute("DELETE FROM employee WHERE id = ?1", [id.as_i64()])
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InUse("employee"),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing("employee"));
    }

    Ok(())
}

/// Count the employees in the database.
pub fn count_employees(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM employee", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as usize)
        .map_err(|error| error.into())
}

/// Fetch the employee making a request and check that `allowed` accepts their role.
///
/// # Errors
///
/// Returns [Error::Forbidden] if the employee no longer exists or their role
/// is not allowed.
pub fn require_role(
    employee_id: EmployeeId,
    allowed: fn(Role) -> bool,
    connection: &Connection,
) -> Result<Employee, Error> {
    let employee = match get_employee(employee_id, connection) {
        Ok(employee) => employee,
        Err(Error::NotFound) => return Err(Error::Forbidden),
        Err(error) => return Err(error),
    };

    if allowed(employee.role) {
        Ok(employee)
    } else {
        tracing::warn!(
            "employee {} with role {} was denied access",
            employee.id,
            employee.role
        );
        Err(Error::Forbidden)
    }
}

fn map_unique_name_error(error: rusqlite::Error, name: &EmployeeName) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateEmployeeName(name.to_string()),
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<Employee, rusqlite::Error> {
    let raw_role: String = row.get(2)?;
    let role = Role::from_str(&raw_role).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Employee {
        id: EmployeeId::new(row.get(0)?),
        name: EmployeeName::new_unchecked(&row.get::<_, String>(1)?),
        role,
        password_hash: PasswordHash::new_unchecked(&row.get::<_, String>(3)?),
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use time::macros::date;

    use crate::{
        Error,
        auth::PasswordHash,
        employee::{EmployeeId, EmployeeName, Role},
        expense::{ExpenseBuilder, create_expense},
        test_utils::{
            must_create_employee, must_create_service, must_create_transaction, open_test_db,
        },
    };

    use super::{
        count_employees, create_employee, create_employee_table, delete_employee,
        get_all_employees, get_employee, get_employee_by_name, require_role, update_employee,
        update_employee_password,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_employee_table(&connection).unwrap();
        connection
    }

    #[test]
    fn create_employee_succeeds() {
        let connection = get_test_connection();
        let name = EmployeeName::new_unchecked("Aroha");

        let employee = create_employee(
            name.clone(),
            Role::Washer,
            PasswordHash::new_unchecked("hash"),
            &connection,
        )
        .unwrap();

        assert!(employee.id.as_i64() > 0);
        assert_eq!(employee.name, name);
        assert_eq!(Ok(employee), get_employee(EmployeeId::new(1), &connection));
    }

    #[test]
    fn create_employee_fails_on_duplicate_name() {
        let connection = get_test_connection();
        must_create_employee("Aroha", Role::Washer, &connection);

        let result = create_employee(
            EmployeeName::new_unchecked("Aroha"),
            Role::Manager,
            PasswordHash::new_unchecked("hash"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmployeeName("Aroha".to_owned())));
    }

    #[test]
    fn get_employee_by_name_ignores_surrounding_whitespace() {
        let connection = get_test_connection();
        let want = must_create_employee("Mere", Role::Manager, &connection);

        let got = get_employee_by_name(" Mere ", &connection);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_missing_employee_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            get_employee(EmployeeId::new(42), &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_all_employees_is_sorted_by_name() {
        let connection = get_test_connection();
        must_create_employee("Wiremu", Role::Washer, &connection);
        must_create_employee("Aroha", Role::Admin, &connection);

        let names: Vec<String> = get_all_employees(&connection)
            .unwrap()
            .into_iter()
            .map(|employee| employee.name.to_string())
            .collect();

        assert_eq!(names, vec!["Aroha", "Wiremu"]);
    }

    #[test]
    fn update_employee_changes_name_and_role() {
        let connection = get_test_connection();
        let employee = must_create_employee("Aroha", Role::Washer, &connection);
        let new_name = EmployeeName::new_unchecked("Aroha T");

        update_employee(employee.id, &new_name, Role::Manager, &connection).unwrap();

        let got = get_employee(employee.id, &connection).unwrap();
        assert_eq!(got.name, new_name);
        assert_eq!(got.role, Role::Manager);
        assert_eq!(got.password_hash, employee.password_hash);
    }

    #[test]
    fn update_missing_employee_fails() {
        let connection = get_test_connection();

        let result = update_employee(
            EmployeeId::new(3),
            &EmployeeName::new_unchecked("Nobody"),
            Role::Washer,
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissing("employee")));
    }

    #[test]
    fn update_password_replaces_hash() {
        let connection = get_test_connection();
        let employee = must_create_employee("Aroha", Role::Washer, &connection);
        let new_hash = PasswordHash::new_unchecked("new hash");

        update_employee_password(employee.id, &new_hash, &connection).unwrap();

        let got = get_employee(employee.id, &connection).unwrap();
        assert_eq!(got.password_hash, new_hash);
    }

    #[test]
    fn delete_employee_removes_row() {
        let connection = get_test_connection();
        let employee = must_create_employee("Aroha", Role::Washer, &connection);

        delete_employee(employee.id, &connection).unwrap();

        assert_eq!(count_employees(&connection), Ok(0));
    }

    #[test]
    fn delete_missing_employee_fails() {
        let connection = get_test_connection();

        assert_eq!(
            delete_employee(EmployeeId::new(9), &connection),
            Err(Error::DeleteMissing("employee"))
        );
    }

    #[test]
    fn delete_employee_with_sales_is_rejected() {
        let connection = open_test_db();
        let employee = must_create_employee("Aroha", Role::Washer, &connection);
        connection
            .execute(
                "INSERT INTO \"transaction\" (date, base_price, commission_amount, tip, employee_id)
                VALUES ('2025-01-01', 20.0, 5.0, 0.0, ?1)",
                [employee.id.as_i64()],
            )
            .unwrap();

        assert_eq!(
            delete_employee(employee.id, &connection),
            Err(Error::InUse("employee"))
        );
    }

    #[test]
    fn delete_employee_assigned_to_a_sale_is_rejected() {
        let connection = open_test_db();
        let employee = must_create_employee("Aroha", Role::Washer, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        must_create_transaction(
            None,
            service.id,
            employee.id,
            date!(2025 - 01 - 05),
            &connection,
        );

        assert_eq!(
            delete_employee(employee.id, &connection),
            Err(Error::InUse("employee"))
        );
    }

    #[test]
    fn delete_employee_with_expenses_is_rejected() {
        let connection = open_test_db();
        let employee = must_create_employee("Aroha", Role::Washer, &connection);
        create_expense(
            ExpenseBuilder {
                date: date!(2025 - 01 - 05),
                amount: 12.5,
                description: "Microfibre cloths".to_owned(),
                employee_id: Some(employee.id),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_employee(employee.id, &connection),
            Err(Error::InUse("employee"))
        );
    }

    #[test]
    fn require_role_allows_matching_role() {
        let connection = get_test_connection();
        let admin = must_create_employee("Boss", Role::Admin, &connection);

        let got = require_role(admin.id, Role::can_manage_employees, &connection);

        assert_eq!(got, Ok(admin));
    }

    #[test]
    fn require_role_forbids_other_roles() {
        let connection = get_test_connection();
        let washer = must_create_employee("Aroha", Role::Washer, &connection);

        let got = require_role(washer.id, Role::can_manage_catalog, &connection);

        assert_eq!(got, Err(Error::Forbidden));
    }

    #[test]
    fn require_role_forbids_unknown_employee() {
        let connection = get_test_connection();

        let got = require_role(EmployeeId::new(7), Role::can_manage_catalog, &connection);

        assert_eq!(got, Err(Error::Forbidden));
    }
}

//! Core employee domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer employee IDs.
///
/// This keeps employee IDs apart from the plain integer IDs used for
/// customers, services and transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct EmployeeId(i64);

impl EmployeeId {
    /// Create a new employee ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the employee ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated, non-empty employee name.
///
/// Employees log in with their name, so names are unique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct EmployeeName(String);

impl EmployeeName {
    /// Create an employee name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName("Employee"))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create an employee name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for EmployeeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for EmployeeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an employee is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Runs the business: manages staff and sees everyone's figures.
    Admin,
    /// Looks after the service catalog, memberships and coupons.
    Manager,
    /// Washes cars and records sales.
    Washer,
}

impl Role {
    /// Every role, in the order they are offered in forms.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Washer];

    /// The name stored in the database and used in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Washer => "washer",
        }
    }

    /// The capitalised name shown to people.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Washer => "Washer",
        }
    }

    /// Whether the role may add, edit and remove employees.
    pub fn can_manage_employees(self) -> bool {
        self == Role::Admin
    }

    /// Whether the role may change the service catalog, memberships and coupons.
    pub fn can_manage_catalog(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Whether the role may delete and merge customer records.
    pub fn can_manage_customers(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Whether the role may delete recorded sales and expenses.
    pub fn can_void_records(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Whether the role may see the commission figures of other employees.
    pub fn can_view_all_commissions(self) -> bool {
        self == Role::Admin
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "washer" => Ok(Role::Washer),
            _ => Err(Error::InvalidRole(s.to_owned())),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Someone who works at the car wash and can log in to the app.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    /// The employee's ID in the application database.
    pub id: EmployeeId,
    /// The name the employee logs in with.
    pub name: EmployeeName,
    /// What the employee is allowed to do.
    pub role: Role,
    /// The employee's password hash.
    pub password_hash: PasswordHash,
}

/// Form data for creating and editing employees.
///
/// When editing, an empty password keeps the current one.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeeFormData {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub password: String,
}

//! Customer and vehicle records.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for a customer.
pub type CustomerId = i64;

/// Database identifier for a vehicle.
pub type VehicleId = i64;

/// Someone who brings their car in to be washed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// The phone number as entered. Use [digits_only] to compare numbers.
    pub phone: String,
    pub email: String,
    pub notes: String,
}

/// The fields needed to create a [Customer].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerBuilder {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
}

impl CustomerBuilder {
    /// Trim every field and check the name is not empty.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if the name is empty.
    pub fn validate(self) -> Result<Self, Error> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(Error::EmptyName("Customer"));
        }

        Ok(Self {
            name: name.to_owned(),
            phone: self.phone.trim().to_owned(),
            email: self.email.trim().to_owned(),
            notes: self.notes.trim().to_owned(),
        })
    }
}

/// Form data for creating customers.
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerFormData {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: String,
}

impl From<CustomerFormData> for CustomerBuilder {
    fn from(form: CustomerFormData) -> Self {
        Self {
            name: form.name,
            phone: form.phone,
            email: form.email,
            notes: form.notes,
        }
    }
}

/// A car that belongs to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub customer_id: CustomerId,
    pub make: String,
    pub model: String,
    pub colour: String,
    /// The licence plate, stored in upper case.
    pub plate: String,
}

/// Form data for adding a vehicle to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleFormData {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub colour: String,
    pub plate: String,
}

impl VehicleFormData {
    /// Trim every field and upper-case the plate.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if the plate is empty.
    pub fn validate(self) -> Result<Self, Error> {
        let plate = self.plate.trim().to_uppercase();

        if plate.is_empty() {
            return Err(Error::EmptyName("Plate"));
        }

        Ok(Self {
            make: self.make.trim().to_owned(),
            model: self.model.trim().to_owned(),
            colour: self.colour.trim().to_owned(),
            plate,
        })
    }
}

/// Strip everything but the ASCII digits from a phone number, so that
/// "021 555-0101" and "0215550101" compare equal.
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

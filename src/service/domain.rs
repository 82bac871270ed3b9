//! Core service catalog types.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for a service.
pub type ServiceId = i64;

/// A service offered by the car wash, e.g. "Express Wash" or "Full Detail".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    /// What the customer pays.
    pub price: f64,
    /// The commission pool shared by the employees who do the work.
    pub commission: f64,
    /// Inactive services are kept for the sales history but cannot be sold.
    pub active: bool,
}

/// The fields needed to create or update a [Service].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceBuilder {
    pub name: String,
    pub price: f64,
    pub commission: f64,
    pub active: bool,
}

impl ServiceBuilder {
    /// Check the name is not empty and the amounts are non-negative numbers.
    ///
    /// Returns the builder with its name trimmed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] or [Error::InvalidAmount].
    pub fn validate(self) -> Result<Self, Error> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(Error::EmptyName("Service"));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidAmount("Price"));
        }

        if !self.commission.is_finite() || self.commission < 0.0 {
            return Err(Error::InvalidAmount("Commission"));
        }

        Ok(Self {
            name: name.to_owned(),
            ..self
        })
    }
}

/// Form data for creating and editing services.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceFormData {
    pub name: String,
    pub price: f64,
    pub commission: f64,
    /// Checkboxes are only sent when ticked.
    pub active: Option<String>,
}

impl From<ServiceFormData> for ServiceBuilder {
    fn from(form: ServiceFormData) -> Self {
        Self {
            name: form.name,
            price: form.price,
            commission: form.commission,
            active: form.active.is_some(),
        }
    }
}

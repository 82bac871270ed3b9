//! The point-of-sale form and its conversion into a [TransactionBuilder].

use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    customer::CustomerId,
    employee::EmployeeId,
    service::ServiceId,
    transaction::{Extra, TransactionBuilder},
};

/// The form data for recording a sale.
///
/// Extras are sent as parallel lists, one entry per row of the extras table.
/// Rows left completely blank are ignored.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The day of the sale.
    pub date: Date,
    /// Empty for walk-in customers.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub service_id: ServiceId,
    #[serde(default)]
    pub tip: Option<f64>,
    /// The employees who did the work, one entry per ticked checkbox.
    #[serde(default, rename = "employee_id")]
    pub employee_ids: Vec<i64>,
    #[serde(default)]
    pub extra_description: Vec<String>,
    #[serde(default)]
    pub extra_price: Vec<String>,
    #[serde(default)]
    pub extra_commission: Vec<String>,
    /// Employee IDs, or an empty string for the shared pool.
    #[serde(default)]
    pub extra_assigned_to: Vec<String>,
}

impl TransactionForm {
    /// Convert the form into a builder, parsing the extras rows.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if an extra's price or commission is not
    /// a number, or [Error::EmptyName] if a row has amounts but no description.
    pub fn into_builder(self) -> Result<TransactionBuilder, Error> {
        let rows = self.extra_description.len().max(self.extra_price.len());
        let mut extras = Vec::new();

        for row in 0..rows {
            let description = field(&self.extra_description, row);
            let price = field(&self.extra_price, row);
            let commission = field(&self.extra_commission, row);
            let assigned_to = field(&self.extra_assigned_to, row);

            if description.is_empty() && price.is_empty() && commission.is_empty() {
                continue;
            }

            if description.is_empty() {
                return Err(Error::EmptyName("Extra"));
            }

            extras.push(Extra {
                description: description.to_owned(),
                price: parse_amount(price, "Extra price")?,
                commission: parse_amount(commission, "Extra commission")?,
                assigned_to: match assigned_to {
                    "" => None,
                    id => Some(EmployeeId::new(
                        id.parse().map_err(|_| Error::InvalidReference("employee"))?,
                    )),
                },
            });
        }

        Ok(TransactionBuilder {
            date: self.date,
            customer_id: self.customer_id,
            service_id: self.service_id,
            tip: self.tip.unwrap_or(0.0),
            assignments: self.employee_ids.into_iter().map(EmployeeId::new).collect(),
            extras,
        })
    }
}

/// The trimmed value of a repeated field in `row`, or an empty string if the
/// row is missing.
fn field(values: &[String], row: usize) -> &str {
    values.get(row).map(|value| value.trim()).unwrap_or("")
}

/// Parse a dollar amount, treating an empty field as zero.
fn parse_amount(text: &str, field: &'static str) -> Result<f64, Error> {
    if text.is_empty() {
        return Ok(0.0);
    }

    text.parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or(Error::InvalidAmount(field))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Error, employee::EmployeeId};

    use super::TransactionForm;

    fn form() -> TransactionForm {
        TransactionForm {
            date: date!(2025 - 05 - 01),
            customer_id: Some(3),
            service_id: 2,
            tip: Some(6.0),
            employee_ids: vec![1, 4],
            extra_description: vec![],
            extra_price: vec![],
            extra_commission: vec![],
            extra_assigned_to: vec![],
        }
    }

    #[test]
    fn blank_extra_rows_are_ignored() {
        let builder = TransactionForm {
            extra_description: vec!["Wax".to_owned(), "".to_owned(), " ".to_owned()],
            extra_price: vec!["12".to_owned(), "".to_owned(), "".to_owned()],
            extra_commission: vec!["4.50".to_owned(), "".to_owned(), "".to_owned()],
            extra_assigned_to: vec!["4".to_owned(), "".to_owned(), "".to_owned()],
            ..form()
        }
        .into_builder()
        .unwrap();

        assert_eq!(builder.assignments, vec![EmployeeId::new(1), EmployeeId::new(4)]);
        assert_eq!(builder.tip, 6.0);
        assert_eq!(builder.extras.len(), 1);
        assert_eq!(builder.extras[0].description, "Wax");
        assert_eq!(builder.extras[0].price, 12.0);
        assert_eq!(builder.extras[0].commission, 4.5);
        assert_eq!(builder.extras[0].assigned_to, Some(EmployeeId::new(4)));
    }

    #[test]
    fn unassigned_extra_goes_to_pool() {
        let builder = TransactionForm {
            extra_description: vec!["Air freshener".to_owned()],
            extra_price: vec!["3".to_owned()],
            extra_commission: vec![String::new()],
            extra_assigned_to: vec![String::new()],
            ..form()
        }
        .into_builder()
        .unwrap();

        assert_eq!(builder.extras[0].assigned_to, None);
        assert_eq!(builder.extras[0].commission, 0.0);
    }

    #[test]
    fn missing_tip_is_zero() {
        let builder = TransactionForm {
            tip: None,
            ..form()
        }
        .into_builder()
        .unwrap();

        assert_eq!(builder.tip, 0.0);
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let result = TransactionForm {
            extra_description: vec!["Wax".to_owned()],
            extra_price: vec!["twelve".to_owned()],
            ..form()
        }
        .into_builder();

        assert_eq!(result, Err(Error::InvalidAmount("Extra price")));
    }

    #[test]
    fn extra_without_description_is_rejected() {
        let result = TransactionForm {
            extra_description: vec![String::new()],
            extra_price: vec!["5".to_owned()],
            ..form()
        }
        .into_builder();

        assert_eq!(result, Err(Error::EmptyName("Extra")));
    }
}

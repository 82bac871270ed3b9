//! Commission and tip attribution for sales worked by more than one employee.
//!
//! [attribute] works out what one employee earned from one sale and
//! [aggregate] totals that over a date range. Both are pure functions over
//! data already loaded from the database.

mod aggregation;
mod attribution;
mod report;

pub use aggregation::{EmployeeSummary, aggregate, attributions_in_range};
pub use attribution::{Attribution, attribute, is_worker, worker_count};
pub use report::{get_commissions_csv, get_commissions_page};

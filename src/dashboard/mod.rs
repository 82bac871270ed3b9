//! Dashboard module
//!
//! Provides the landing page with today's sales, the employee's earnings
//! this month and a chart of recent revenue.

mod aggregation;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;

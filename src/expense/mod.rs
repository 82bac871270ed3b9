//! Expenses paid by the business or by employees.

mod core;
mod create;
mod delete;
mod expenses_page;

pub use core::{
    Expense, ExpenseBuilder, ExpenseId, create_expense, create_expense_table, delete_expense,
    get_expense, get_expenses_in_range,
};
pub use create::{create_expense_endpoint, get_new_expense_page};
pub use delete::delete_expense_endpoint;
pub use expenses_page::get_expenses_page;

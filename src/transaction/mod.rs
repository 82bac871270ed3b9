//! Sales recorded at the point of sale.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for recording sales
//! - Database functions for storing, querying, and deleting transactions
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;
mod new_transaction_page;
mod transactions_page;

pub use core::{
    Extra, Transaction, TransactionBuilder, TransactionId, count_customer_visits,
    create_transaction, create_transaction_tables, delete_transaction, get_transaction,
    get_transactions_in_range,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;

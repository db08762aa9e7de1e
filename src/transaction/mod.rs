//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction`
//! - Validation of client supplied transactions
//! - Database functions for storing and querying a user's transactions
//! - The JSON route handlers

mod core;
mod endpoints;
mod form;

pub use core::{
    NewTransaction, Transaction, TransactionId, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, get_transactions,
    map_transaction_row, update_transaction,
};
pub(crate) use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};
pub use form::TransactionForm;

#[cfg(test)]
pub(crate) use core::test_utils;

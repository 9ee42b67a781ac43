//! Purchases, sales and customer payments that make up the ledger.
//!
//! A transaction's required fields depend on its [TransactionType], see
//! [validate_transaction].

mod db;
mod domain;
mod handlers;
mod validation;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction, find_missing_references,
    get_all_transaction_views, get_transaction, get_transaction_view, update_transaction,
};
pub use domain::{
    NewTransaction, Transaction, TransactionDraft, TransactionForm, TransactionId,
    TransactionType, TransactionView,
};
pub use handlers::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, patch_transaction_endpoint, replace_transaction_endpoint,
};
pub use validation::validate_transaction;

//! The immutable transaction ledger of a financial year.

mod core;
mod create_endpoint;

pub use core::{
    FinancialTransaction, NewTransaction, create_transaction_table, get_transactions,
    insert_transaction,
};
pub use create_endpoint::post_create_transaction;

pub(crate) use core::{TRANSACTION_COLUMNS, map_row_to_transaction};

//! Income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, `TransactionBuilder` and date range filter
//! - Database functions for storing, querying, and managing transactions
//! - Date filtering and sorting of the rows shown in the transactions table
//! - View handlers for the transaction pages and their endpoints

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod filter;
mod form;
mod sort;
mod transactions_page;

pub use core::{
    DateRange, Transaction, TransactionBuilder, TransactionKind, UnknownTransactionKind,
    count_transactions, create_transaction, create_transaction_table, delete_transaction,
    format_timestamp, get_all_transactions, get_transaction, get_transactions,
    get_transactions_between, map_transaction_row, parse_amount, parse_date, parse_timestamp,
    update_transaction,
};
pub use filter::{DateFilter, date_range};
pub use sort::{SortColumn, SortOrder, sort_transactions};

pub(crate) use create_endpoint::create_transaction_endpoint;
pub(crate) use create_page::get_create_transaction_page;
pub(crate) use delete_endpoint::delete_transaction_endpoint;
pub(crate) use edit_endpoint::edit_transaction_endpoint;
pub(crate) use edit_page::get_edit_transaction_page;
pub(crate) use filter::filter_bar;
pub(crate) use transactions_page::get_transactions_page;

//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions that does not
//! depend on a storage backend:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Aggregation of balances and totals
//! - Filtering by type, description and date

mod core;
mod filter;
mod summary;

pub use self::core::{Transaction, TransactionBuilder, TransactionType, parse_timestamp};
pub use filter::{TransactionFilter, TypeFilter, filter_transactions};
pub use summary::{Summary, balance_of, sort_newest_first, summarize};

pub(crate) use self::core::format_timestamp;
pub(crate) use summary::sort_for_listing;

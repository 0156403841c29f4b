//! Finance tracker is the storage and aggregation core of a personal finance
//! app.
//!
//! Transactions are persisted in SQLite when it is available, or in a flat
//! key-value blob store otherwise. On top of the stores sit two pure
//! functions used by screen-level code: [summarize] for balances and totals,
//! and [filter_transactions] for narrowing a transaction list.

#![warn(missing_docs)]

mod app_state;
mod backend;
mod config;
mod currency;
mod database_id;
mod db;
mod key_value;
mod logging;
mod stores;
mod theme;
mod timezone;
mod transaction;

pub use app_state::AppContext;
pub use backend::{Storage, StorageMode, select_backend};
pub use config::{BackendPreference, Config};
pub use currency::CurrencyFormatter;
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use key_value::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use logging::setup_logging;
pub use stores::{KeyValueTransactionStore, RelationalTransactionStore, TransactionStore};
pub use theme::{ThemeMode, ThemePreference};
pub use timezone::{format_local_datetime, local_offset};
pub use transaction::{
    Summary, Transaction, TransactionBuilder, TransactionFilter, TransactionType, TypeFilter,
    balance_of, filter_transactions, parse_timestamp, sort_newest_first, summarize,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The amount was negative, NaN or infinite.
    #[error("{0} is not a valid amount, amounts must be finite and not negative")]
    InvalidAmount(f64),

    /// A transaction was created with an empty description.
    #[error("the description cannot be empty")]
    EmptyDescription,

    /// A transaction type other than "income" or "expense" was given.
    #[error("\"{0}\" is not a valid transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// A date string could not be parsed as an RFC 3339 timestamp or a
    /// `YYYY-MM-DD` date.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// A key for the key-value store was empty or contained characters other
    /// than ASCII letters, digits, `_` and `-`.
    #[error("\"{0}\" is not a valid storage key")]
    InvalidKey(String),

    /// The caller supplied a transaction ID that is already in use.
    #[error("a transaction with the ID {0} already exists")]
    DuplicateId(TransactionId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Reading or writing the key-value store failed.
    ///
    /// The string holds the original I/O error message.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// Persisted data could not be deserialized.
    #[error("stored data is corrupt: {0}")]
    CorruptData(String),

    /// An error occurred while serializing a value as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A canonical timezone name could not be found, e.g. "Asia/Dhaka".
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The currency symbol could not be used as a number prefix.
    #[error("invalid currency symbol \"{0}\"")]
    InvalidCurrencySymbol(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

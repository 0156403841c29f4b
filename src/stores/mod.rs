//! Contains the traits and implementations for objects that store the
//! application's transactions.

mod key_value;
pub mod sqlite;
mod transaction;

pub use key_value::KeyValueTransactionStore;
pub use sqlite::RelationalTransactionStore;
pub use transaction::TransactionStore;

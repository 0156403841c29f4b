//! Database ID type definition.

/// Alias for the integer type used for transaction IDs in both stores.
pub type TransactionId = i64;

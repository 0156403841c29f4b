//! Defines the transaction store trait.

use async_trait::async_trait;

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{Transaction, TransactionBuilder},
};

/// Handles the creation, retrieval, modification and deletion of
/// transactions.
///
/// Every implementation returns lists in the same order: newest date first,
/// and among equal dates the larger ID first. IDs assigned by a store always
/// increase, so without caller-supplied IDs that is also the most recently
/// created transaction first.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Validate `builder` and persist it as a new transaction.
    ///
    /// The store assigns a new unique ID unless the builder carries one.
    ///
    /// # Errors
    /// Implementers should return a:
    /// - [Error::InvalidAmount] or [Error::EmptyDescription] if the builder is not valid,
    /// - [Error::DuplicateId] if the builder's ID is already in use,
    /// - or another [Error] if the transaction could not be persisted.
    async fn create_transaction(&self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve every transaction, newest first.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, Error>;

    /// Retrieve a transaction by its `id`.
    ///
    /// # Errors
    /// Implementers should return [Error::NotFound] if `id` does not refer to
    /// a stored transaction.
    async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Replace every field except the ID of the stored transaction with the
    /// same ID as `transaction`.
    ///
    /// Returns `false` and changes nothing if no transaction has that ID.
    ///
    /// # Errors
    /// Implementers should return [Error::InvalidAmount] if the new amount is
    /// not valid.
    async fn update_transaction(&self, transaction: &Transaction) -> Result<bool, Error>;

    /// Delete the transaction with `id`.
    ///
    /// Returns `false` if there was nothing to delete, so deleting twice is
    /// not an error.
    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, Error>;

    /// The total income minus the total expenses over every transaction.
    async fn get_balance(&self) -> Result<f64, Error>;
}

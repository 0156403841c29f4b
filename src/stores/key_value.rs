//! Implements a transaction store that keeps every transaction in one JSON
//! blob of a [KeyValueStore].

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    Error,
    database_id::TransactionId,
    key_value::KeyValueStore,
    stores::TransactionStore,
    transaction::{Transaction, TransactionBuilder, balance_of, sort_for_listing},
};

/// The key of the JSON array holding every transaction.
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Stores transactions as a JSON array under [TRANSACTIONS_KEY].
///
/// New transactions are prepended, so the blob is most-recent-first. Reads
/// of a blob that cannot be parsed behave as if the store were empty, while
/// writes refuse to overwrite it.
///
/// Creates, updates and deletes read the whole blob, modify it and write it
/// back. These steps are serialized per store instance so concurrent calls
/// cannot lose each other's changes.
pub struct KeyValueTransactionStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl KeyValueTransactionStore {
    /// Create a new transaction store on top of `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the stored transactions in blob order.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::CorruptData] if the blob is not a valid transaction list,
    /// - or [Error::Io] if the blob cannot be read.
    async fn load(&self) -> Result<Vec<Transaction>, Error> {
        match self.store.get_item(TRANSACTIONS_KEY).await? {
            Some(blob) => {
                serde_json::from_str(&blob).map_err(|error| Error::CorruptData(error.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Load the stored transactions, treating a corrupt blob as empty.
    async fn load_for_reading(&self) -> Result<Vec<Transaction>, Error> {
        match self.load().await {
            Err(Error::CorruptData(message)) => {
                tracing::error!("could not parse the stored transactions, reading them as empty: {message}");
                Ok(Vec::new())
            }
            result => result,
        }
    }

    async fn save(&self, transactions: &[Transaction]) -> Result<(), Error> {
        let blob = serde_json::to_string(transactions)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        self.store.set_item(TRANSACTIONS_KEY, &blob).await
    }
}

/// Pick an ID from the current time in milliseconds, moving past the
/// largest existing ID if the clock has not.
///
/// If the largest ID is [TransactionId::MAX], the first unused ID counting
/// up from the current time is used instead, wrapping around to the
/// smallest IDs.
fn next_id(transactions: &[Transaction]) -> TransactionId {
    let now = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as TransactionId;
    let largest = transactions.iter().map(|transaction| transaction.id).max();

    match largest {
        None => now,
        Some(largest) => match largest.checked_add(1) {
            Some(after_largest) => now.max(after_largest),
            None => {
                let used: HashSet<TransactionId> =
                    transactions.iter().map(|transaction| transaction.id).collect();

                (now..=TransactionId::MAX)
                    .chain(TransactionId::MIN..now)
                    .find(|id| !used.contains(id))
                    .unwrap_or(now)
            }
        },
    }
}

#[async_trait]
impl TransactionStore for KeyValueTransactionStore {
    async fn create_transaction(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        builder.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut transactions = self.load().await?;

        let id = match builder.id {
            Some(id) if transactions.iter().any(|transaction| transaction.id == id) => {
                return Err(Error::DuplicateId(id));
            }
            Some(id) => id,
            None => next_id(&transactions),
        };

        let transaction = builder.finalise(id);
        transactions.insert(0, transaction.clone());
        self.save(&transactions).await?;

        tracing::debug!("created transaction {id} in the key-value store");

        Ok(transaction)
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, Error> {
        let mut transactions = self.load_for_reading().await?;
        sort_for_listing(&mut transactions);

        Ok(transactions)
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.load_for_reading()
            .await?
            .into_iter()
            .find(|transaction| transaction.id == id)
            .ok_or(Error::NotFound)
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<bool, Error> {
        transaction.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut transactions = self.load().await?;

        let Some(stored) = transactions
            .iter_mut()
            .find(|stored| stored.id == transaction.id)
        else {
            tracing::debug!("no transaction {} to update in the key-value store", transaction.id);
            return Ok(false);
        };

        *stored = transaction.clone();
        self.save(&transactions).await?;

        Ok(true)
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, Error> {
        let _guard = self.write_lock.lock().await;
        let mut transactions = self.load().await?;

        let count_before = transactions.len();
        transactions.retain(|transaction| transaction.id != id);

        if transactions.len() == count_before {
            return Ok(false);
        }

        self.save(&transactions).await?;

        Ok(true)
    }

    async fn get_balance(&self) -> Result<f64, Error> {
        let transactions = self.load_for_reading().await?;

        Ok(balance_of(&transactions))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use crate::{
        Error,
        key_value::{KeyValueStore, MemoryKeyValueStore},
        stores::TransactionStore,
        transaction::{Transaction, TransactionType},
    };

    use super::{KeyValueTransactionStore, TRANSACTIONS_KEY, next_id};

    fn get_store() -> (KeyValueTransactionStore, Arc<MemoryKeyValueStore>) {
        let key_value = Arc::new(MemoryKeyValueStore::new());

        (KeyValueTransactionStore::new(key_value.clone()), key_value)
    }

    fn coffee() -> crate::transaction::TransactionBuilder {
        Transaction::build(
            4.5,
            datetime!(2024-01-01 8:00 UTC),
            "Coffee",
            TransactionType::Expense,
        )
    }

    #[tokio::test]
    async fn create_prepends_to_blob() {
        let (store, key_value) = get_store();
        let first = store.create_transaction(coffee()).await.unwrap();
        let second = store.create_transaction(coffee()).await.unwrap();

        let blob = key_value.get_item(TRANSACTIONS_KEY).await.unwrap().unwrap();
        let stored: Vec<Transaction> = serde_json::from_str(&blob).unwrap();

        assert_eq!(stored, vec![second, first]);
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let (store, _) = get_store();

        let mut ids = Vec::new();
        for _ in 0..20 {
            ids.push(store.create_transaction(coffee()).await.unwrap().id);
        }

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[tokio::test]
    async fn create_fails_on_duplicate_id() {
        let (store, _) = get_store();
        store
            .create_transaction(coffee().id(Some(42)))
            .await
            .unwrap();

        let result = store.create_transaction(coffee().id(Some(42))).await;

        assert_eq!(result, Err(Error::DuplicateId(42)));
    }

    #[test]
    fn next_id_moves_past_future_ids() {
        let far_future = i64::MAX - 10;
        let transactions = vec![coffee().finalise(far_future)];

        assert_eq!(next_id(&transactions), far_future + 1);
    }

    #[test]
    fn next_id_finds_unused_id_after_largest_possible_id() {
        let transactions = vec![coffee().finalise(i64::MAX)];

        let id = next_id(&transactions);

        assert_ne!(id, i64::MAX);
    }

    #[tokio::test]
    async fn create_after_largest_possible_id_assigns_unique_id() {
        let (store, _) = get_store();
        let supplied = store
            .create_transaction(coffee().id(Some(i64::MAX)))
            .await
            .unwrap();

        let assigned = store.create_transaction(coffee()).await.unwrap();

        assert_ne!(assigned.id, supplied.id);
        assert_eq!(
            store.get_transaction(assigned.id).await,
            Ok(assigned.clone())
        );
        assert_eq!(store.list_transactions().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reads_legacy_blob_written_by_older_versions() {
        let (store, key_value) = get_store();
        key_value
            .set_item(
                TRANSACTIONS_KEY,
                r#"[
                    {"id":1704153600000,"amount":"40","description":"Lunch","date":"2024-01-02T00:00:00.000Z","type":"expense"},
                    {"id":1704067200000,"amount":100,"description":"Salary","date":"2024-01-01T00:00:00.000Z","type":"income"},
                    {"id":1704067200001,"amount":"abc","description":"Broken","date":"2024-01-01T00:00:00.000Z","type":"income"}
                ]"#,
            )
            .await
            .unwrap();

        let transactions = store.list_transactions().await.unwrap();
        let balance = store.get_balance().await.unwrap();

        assert_eq!(transactions.len(), 3);
        assert_eq!(balance, 60.0);
    }

    #[tokio::test]
    async fn corrupt_blob_reads_as_empty() {
        let (store, key_value) = get_store();
        key_value
            .set_item(TRANSACTIONS_KEY, "{not json")
            .await
            .unwrap();

        assert_eq!(store.list_transactions().await, Ok(vec![]));
        assert_eq!(store.get_balance().await, Ok(0.0));
        assert_eq!(store.get_transaction(1).await, Err(Error::NotFound));
    }

    #[tokio::test]
    async fn corrupt_blob_is_not_overwritten() {
        let (store, key_value) = get_store();
        key_value
            .set_item(TRANSACTIONS_KEY, "{not json")
            .await
            .unwrap();

        let result = store.create_transaction(coffee()).await;

        assert!(matches!(result, Err(Error::CorruptData(_))));
        assert_eq!(
            key_value.get_item(TRANSACTIONS_KEY).await,
            Ok(Some("{not json".to_owned()))
        );
    }

    #[tokio::test]
    async fn concurrent_creates_do_not_lose_updates() {
        let (store, _) = get_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_transaction(coffee()).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list_transactions().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn reads_blob_with_missing_and_null_fields() {
        let (store, key_value) = get_store();
        key_value
            .set_item(
                TRANSACTIONS_KEY,
                r#"[
                    {"id":2,"amount":40,"description":"Lunch","date":"2024-01-02T00:00:00.000Z"},
                    {"id":1,"amount":100,"description":"Salary","date":"2024-01-01T00:00:00.000Z","type":"income"},
                    {"id":3,"description":null,"date":"2024-01-03T00:00:00.000Z","type":"income"}
                ]"#,
            )
            .await
            .unwrap();

        let transactions = store.list_transactions().await.unwrap();

        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].description, "");
        assert_eq!(transactions[1].kind, TransactionType::Expense);
        assert_eq!(store.get_balance().await, Ok(60.0));

        let created = store.create_transaction(coffee()).await;
        assert!(created.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_deletes_and_creates_are_all_kept() {
        let (store, _) = get_store();
        let store = Arc::new(store);
        for id in 1..=10 {
            store
                .create_transaction(coffee().id(Some(id)))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for id in 1..=5 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let updated = Transaction {
                    amount: 100.0,
                    ..coffee().finalise(id)
                };
                store.update_transaction(&updated).await.map(|_| ())
            }));
        }
        for id in 6..=10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.delete_transaction(id).await.map(|_| ())
            }));
        }
        for _ in 0..5 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_transaction(coffee()).await.map(|_| ())
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let transactions = store.list_transactions().await.unwrap();
        let updated: Vec<_> = transactions
            .iter()
            .filter(|transaction| transaction.amount == 100.0)
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(transactions.len(), 10);
        assert_eq!(updated.len(), 5);
        assert!(updated.iter().all(|id| (1..=5).contains(id)));
        assert!(transactions.iter().all(|transaction| !(6..=10).contains(&transaction.id)));
    }
}

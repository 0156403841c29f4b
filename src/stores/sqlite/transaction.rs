//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    database_id::TransactionId,
    stores::TransactionStore,
    transaction::{
        Transaction, TransactionBuilder, TransactionType, format_timestamp, parse_timestamp,
        sort_for_listing,
    },
};

const SELECT_COLUMNS: &str = "SELECT id, amount, description, date, type FROM transactions";

/// Stores transactions in the `transactions` table of a SQLite database.
///
/// The schema must have been created with [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct RelationalTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl RelationalTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn with_connection<T>(
        &self,
        query: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        query(&connection)
    }
}

#[async_trait]
impl TransactionStore for RelationalTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] or [Error::EmptyDescription] if the builder is not valid,
    /// - [Error::DuplicateId] if the builder's ID already exists,
    /// - or [Error::SqlError] if there is some other SQL error.
    async fn create_transaction(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        builder.validate()?;
        let date = format_timestamp(builder.date)?;

        let transaction = self.with_connection(|connection| {
            let result = match builder.id {
                Some(id) => connection
                    .prepare(
                        "INSERT INTO transactions (id, amount, description, date, type)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         RETURNING id, amount, description, date, type",
                    )?
                    .query_row(
                        (
                            id,
                            builder.amount,
                            &builder.description,
                            &date,
                            builder.kind.as_str(),
                        ),
                        map_transaction_row,
                    ),
                None => connection
                    .prepare(
                        "INSERT INTO transactions (amount, description, date, type)
                         VALUES (?1, ?2, ?3, ?4)
                         RETURNING id, amount, description, date, type",
                    )?
                    .query_row(
                        (
                            builder.amount,
                            &builder.description,
                            &date,
                            builder.kind.as_str(),
                        ),
                        map_transaction_row,
                    ),
            };

            result.map_err(|error| match (error, builder.id) {
                (
                    rusqlite::Error::SqliteFailure(
                        rusqlite::ffi::Error {
                            code: _,
                            extended_code:
                                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                                | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                        },
                        _,
                    ),
                    Some(id),
                ) => Error::DuplicateId(id),
                (error, _) => error.into(),
            })
        })?;

        tracing::debug!("created transaction {} in SQLite", transaction.id);

        Ok(transaction)
    }

    /// Retrieve all transactions, newest first.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is an SQL error.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, Error> {
        let mut transactions = self.with_connection(|connection| {
            connection
                .prepare(&format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC"))?
                .query_map([], map_transaction_row)?
                .map(|transaction_result| transaction_result.map_err(Error::SqlError))
                .collect::<Result<Vec<_>, _>>()
        })?;

        // Text ordering of timestamps can disagree with the actual instants
        // when the fractional seconds have different lengths.
        sort_for_listing(&mut transactions);

        Ok(transactions)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.with_connection(|connection| {
            let transaction = connection
                .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
                .query_row(&[(":id", &id)], map_transaction_row)?;

            Ok(transaction)
        })
    }

    /// Replace the amount, description, date and type of a transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the new amount is not valid,
    /// - or [Error::SqlError] if there is an SQL error.
    async fn update_transaction(&self, transaction: &Transaction) -> Result<bool, Error> {
        transaction.validate()?;
        let date = format_timestamp(transaction.date)?;

        let rows_affected = self.with_connection(|connection| {
            connection
                .execute(
                    "UPDATE transactions
                     SET amount = ?1, description = ?2, date = ?3, type = ?4
                     WHERE id = ?5",
                    (
                        transaction.amount,
                        &transaction.description,
                        &date,
                        transaction.kind.as_str(),
                        transaction.id,
                    ),
                )
                .map_err(Error::from)
        })?;

        if rows_affected == 0 {
            tracing::debug!("no transaction {} to update in SQLite", transaction.id);
        }

        Ok(rows_affected > 0)
    }

    /// Delete a transaction by its `id`.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is an SQL error.
    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, Error> {
        let rows_affected = self.with_connection(|connection| {
            connection
                .execute("DELETE FROM transactions WHERE id = ?1", (id,))
                .map_err(Error::from)
        })?;

        Ok(rows_affected > 0)
    }

    /// Sum income and expenses with one aggregate query.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is an SQL error.
    async fn get_balance(&self) -> Result<f64, Error> {
        let (income, expense): (f64, f64) = self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT
                        COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0.0),
                        COALESCE(SUM(CASE WHEN type = 'income' THEN NULL ELSE amount END), 0.0)
                     FROM transactions",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .map_err(Error::from)
        })?;

        Ok(income - expense)
    }
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns `id, amount, description, date, type` in
/// that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let description: Option<String> = row.get(2)?;
    let date: String = row.get(3)?;
    let kind: String = row.get(4)?;

    let date = parse_timestamp(&date)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id,
        amount,
        description: description.unwrap_or_default(),
        date,
        kind: TransactionType::from_stored(&kind),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        stores::TransactionStore,
        transaction::{Transaction, TransactionType},
    };

    use super::RelationalTransactionStore;

    fn get_store() -> (RelationalTransactionStore, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        (RelationalTransactionStore::new(conn.clone()), conn)
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let (store, _) = get_store();
        let builder = Transaction::build(
            12.3,
            datetime!(2024-01-01 0:00 UTC),
            "Coffee",
            TransactionType::Expense,
        );

        let first = store.create_transaction(builder.clone()).await.unwrap();
        let second = store.create_transaction(builder).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn create_keeps_caller_supplied_id() {
        let (store, _) = get_store();
        let builder = Transaction::build(
            12.3,
            datetime!(2024-01-01 0:00 UTC),
            "Coffee",
            TransactionType::Expense,
        )
        .id(Some(1704067200000));

        let transaction = store.create_transaction(builder).await.unwrap();

        assert_eq!(transaction.id, 1704067200000);
    }

    #[tokio::test]
    async fn create_fails_on_duplicate_id() {
        let (store, _) = get_store();
        let builder = Transaction::build(
            12.3,
            datetime!(2024-01-01 0:00 UTC),
            "Coffee",
            TransactionType::Expense,
        )
        .id(Some(42));
        store.create_transaction(builder.clone()).await.unwrap();

        let result = store.create_transaction(builder).await;

        assert_eq!(result, Err(Error::DuplicateId(42)));
    }

    #[tokio::test]
    async fn get_fails_on_invalid_id() {
        let (store, _) = get_store();

        let result = store.get_transaction(654).await;

        assert_eq!(result, Err(Error::NotFound));
    }

    #[tokio::test]
    async fn stores_dates_as_utc_rfc3339_text() {
        let (store, conn) = get_store();
        store
            .create_transaction(Transaction::build(
                1.0,
                datetime!(2024-01-01 6:00 +6),
                "Tea",
                TransactionType::Expense,
            ))
            .await
            .unwrap();

        let stored: String = conn
            .lock()
            .unwrap()
            .query_row("SELECT date FROM transactions", [], |row| row.get(0))
            .unwrap();

        assert_eq!(stored, "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn unknown_type_in_table_counts_as_expense() {
        let (store, conn) = get_store();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO transactions (amount, description, date, type)
                 VALUES (10.0, 'Mystery', '2024-01-01T00:00:00Z', 'refund')",
                (),
            )
            .unwrap();

        let transactions = store.list_transactions().await.unwrap();
        let balance = store.get_balance().await.unwrap();

        assert_eq!(transactions[0].kind, TransactionType::Expense);
        assert_eq!(balance, -10.0);
    }

    #[tokio::test]
    async fn null_description_reads_as_empty() {
        let (store, conn) = get_store();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO transactions (amount, description, date, type)
                 VALUES (10.0, NULL, '2024-01-01T00:00:00Z', 'income')",
                (),
            )
            .unwrap();

        let transaction = store.get_transaction(1).await.unwrap();

        assert_eq!(transaction.description, "");
    }

    #[tokio::test]
    async fn operations_fail_without_schema() {
        let conn = Connection::open_in_memory().unwrap();
        let store = RelationalTransactionStore::new(Arc::new(Mutex::new(conn)));

        let result = store.list_transactions().await;

        assert!(matches!(result, Err(Error::SqlError(_))));
    }
}

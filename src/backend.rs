//! Chooses between the SQLite and key-value transaction stores at startup.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use crate::{
    config::{BackendPreference, Config},
    db::initialize,
    key_value::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore},
    stores::{KeyValueTransactionStore, RelationalTransactionStore, TransactionStore, sqlite},
};

/// Which backend the transaction store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Transactions are stored in a SQLite table.
    Relational,
    /// Transactions are stored as a JSON blob in the key-value store.
    KeyValue,
}

impl Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Relational => f.write_str("relational"),
            StorageMode::KeyValue => f.write_str("key-value"),
        }
    }
}

/// The stores chosen by [select_backend].
#[derive(Clone)]
pub struct Storage {
    /// The backend behind `transactions`.
    pub mode: StorageMode,
    /// The transaction store for the chosen backend.
    pub transactions: Arc<dyn TransactionStore>,
    /// The key-value store, available in both modes.
    pub key_value: Arc<dyn KeyValueStore>,
}

/// Open the stores described by `config`.
///
/// SQLite is used if the database file can be opened and read, unless the
/// config asks for the key-value store. This never fails: problems are
/// logged and the next best option is used. The choice does not change for
/// the lifetime of the returned [Storage].
pub fn select_backend(config: &Config) -> Storage {
    let key_value = open_key_value_store(config);

    let connection = match config.backend {
        BackendPreference::KeyValue => {
            tracing::info!("the key-value backend was requested, skipping SQLite");
            None
        }
        BackendPreference::Auto => {
            let path = config.database_path();

            match sqlite::open_database(&path) {
                Ok(connection) => Some(connection),
                Err(error) => {
                    tracing::warn!(
                        "could not open the database at {}, falling back to the key-value store: {error}",
                        path.display()
                    );
                    None
                }
            }
        }
    };

    let Some(connection) = connection else {
        return Storage {
            mode: StorageMode::KeyValue,
            transactions: Arc::new(KeyValueTransactionStore::new(key_value.clone())),
            key_value,
        };
    };

    if let Err(error) = initialize(&connection) {
        tracing::error!("could not create the database tables: {error}");
    }

    tracing::info!("storing transactions in {}", config.database_path().display());

    Storage {
        mode: StorageMode::Relational,
        transactions: Arc::new(RelationalTransactionStore::new(Arc::new(Mutex::new(
            connection,
        )))),
        key_value,
    }
}

fn open_key_value_store(config: &Config) -> Arc<dyn KeyValueStore> {
    let path = config.key_value_path();

    match FileKeyValueStore::new(&path) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            tracing::error!(
                "could not create the key-value directory {}, keeping data in memory only: {error}",
                path.display()
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}

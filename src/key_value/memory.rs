//! Implements a key-value store that lives in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;

use super::{KeyValueStore, validate_key};

/// Keeps values in memory. Nothing survives the process.
///
/// Used when the configured data directory cannot be created, and in tests.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        validate_key(key)?;

        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        validate_key(key)?;

        self.items
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), Error> {
        validate_key(key)?;

        self.items.write().await.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, key_value::KeyValueStore};

    use super::MemoryKeyValueStore;

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryKeyValueStore::new();

        store.set_item("greeting", "hello").await.unwrap();

        assert_eq!(
            store.get_item("greeting").await,
            Ok(Some("hello".to_owned()))
        );
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryKeyValueStore::new();

        assert_eq!(store.get_item("nothing").await, Ok(None));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = MemoryKeyValueStore::new();
        store.set_item("greeting", "hello").await.unwrap();

        store.remove_item("greeting").await.unwrap();
        store.remove_item("greeting").await.unwrap();

        assert_eq!(store.get_item("greeting").await, Ok(None));
    }

    #[tokio::test]
    async fn rejects_invalid_key() {
        let store = MemoryKeyValueStore::new();

        let result = store.set_item("a/b", "x").await;

        assert_eq!(result, Err(Error::InvalidKey("a/b".to_owned())));
    }
}

//! A minimal async key-value store for named string blobs.
//!
//! The transaction store falls back to a single blob in this store when
//! SQLite is not available, and the theme preference is always kept here.

mod file;
mod memory;

use async_trait::async_trait;

use crate::Error;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

/// Reads, writes and removes string values by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, or `None` if nothing is stored.
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove the value stored under `key`. Removing a missing key is not an
    /// error.
    async fn remove_item(&self, key: &str) -> Result<(), Error>;
}

/// Check that `key` is non-empty and only contains ASCII letters, digits,
/// `_` and `-`.
///
/// Keys double as file names in [FileKeyValueStore].
///
/// # Errors
/// Returns [Error::InvalidKey] if the key is not valid.
pub(crate) fn validate_key(key: &str) -> Result<(), Error> {
    let is_valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if is_valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_owned()))
    }
}

//! Settings that decide where data is stored and how it is displayed.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The default data directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = "data";
/// The file name of the SQLite database inside the data directory.
const DEFAULT_DATABASE_FILE: &str = "finance_tracker.db";
/// The name of the key-value directory inside the data directory.
const DEFAULT_KEY_VALUE_DIR: &str = "storage";
const DEFAULT_CURRENCY_SYMBOL: &str = "৳";
const DEFAULT_TIMEZONE: &str = "Asia/Dhaka";

/// Which transaction backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// Use SQLite if the database can be opened, otherwise the key-value store.
    #[default]
    Auto,
    /// Always use the key-value store.
    KeyValue,
}

/// Application settings.
///
/// Every field has a default, so an empty JSON object is a valid config.
/// Relative paths for the database file and the key-value directory are
/// resolved against `data_dir`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The directory holding all persisted data.
    pub data_dir: PathBuf,
    /// The SQLite database file.
    pub database_file: PathBuf,
    /// The directory of the key-value store.
    pub key_value_dir: PathBuf,
    /// Which transaction backend to use.
    pub backend: BackendPreference,
    /// The symbol placed before formatted amounts.
    pub currency_symbol: String,
    /// The canonical name of the timezone dates are displayed in, e.g. "Asia/Dhaka".
    pub timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            database_file: PathBuf::from(DEFAULT_DATABASE_FILE),
            key_value_dir: PathBuf::from(DEFAULT_KEY_VALUE_DIR),
            backend: BackendPreference::Auto,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_owned(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
        }
    }
}

impl Config {
    /// A default config storing everything under `data_dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Set the backend preference.
    pub fn backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// The full path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    /// The full path of the key-value directory.
    pub fn key_value_path(&self) -> PathBuf {
        self.data_dir.join(&self.key_value_dir)
    }
}

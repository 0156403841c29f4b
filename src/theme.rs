//! The persisted light/dark appearance preference.

use std::{fmt::Display, sync::Arc};

use tokio::sync::RwLock;

use crate::key_value::KeyValueStore;

/// The key the theme mode is stored under.
const THEME_KEY: &str = "appTheme";

/// The appearance of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Dark text on a light background.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl ThemeMode {
    /// The persisted name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    fn from_stored(value: &str) -> Self {
        if value == "dark" {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }
}

impl Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current theme mode, kept in sync with the key-value store.
///
/// Persistence is best effort: the mode in memory always changes, and a
/// failed write is only logged.
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
    mode: RwLock<ThemeMode>,
}

impl ThemePreference {
    /// Load the stored preference, using [ThemeMode::Light] if nothing valid
    /// is stored or the store cannot be read.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mode = match store.get_item(THEME_KEY).await {
            Ok(Some(value)) => ThemeMode::from_stored(&value),
            Ok(None) => ThemeMode::default(),
            Err(error) => {
                tracing::warn!("could not load the theme preference, using light mode: {error}");
                ThemeMode::default()
            }
        };

        Self {
            store,
            mode: RwLock::new(mode),
        }
    }

    /// The current mode.
    pub async fn mode(&self) -> ThemeMode {
        *self.mode.read().await
    }

    /// Switch to `mode` and persist it.
    pub async fn set_mode(&self, mode: ThemeMode) {
        let mut current = self.mode.write().await;
        *current = mode;
        self.persist(mode).await;
    }

    /// Switch to the other mode, persist it and return it.
    pub async fn toggle(&self) -> ThemeMode {
        let mut current = self.mode.write().await;
        *current = current.toggled();
        let mode = *current;
        self.persist(mode).await;

        mode
    }

    async fn persist(&self, mode: ThemeMode) {
        if let Err(error) = self.store.set_item(THEME_KEY, mode.as_str()).await {
            tracing::warn!("could not save the theme preference \"{mode}\": {error}");
        }
    }
}

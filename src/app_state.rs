//! Implements the struct that holds everything the screens of the app need.

use std::sync::Arc;

use crate::{
    Error,
    backend::{StorageMode, select_backend},
    config::Config,
    currency::CurrencyFormatter,
    stores::TransactionStore,
    theme::ThemePreference,
    timezone::local_offset,
};

/// The state shared by the screens of the app.
///
/// Create one with [AppContext::initialize] at startup and pass it to
/// whatever needs it. Dropping it releases the stores.
pub struct AppContext {
    /// Which backend the transactions are stored in.
    pub storage_mode: StorageMode,

    /// The transaction store.
    pub transactions: Arc<dyn TransactionStore>,

    /// The light/dark appearance preference.
    pub theme: ThemePreference,

    /// Formats amounts with the configured currency symbol.
    pub currency: CurrencyFormatter,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Dhaka".
    pub local_timezone: String,
}

impl AppContext {
    /// Select the storage backend and load the persisted preferences.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCurrencySymbol] if the configured symbol cannot be used,
    /// - or [Error::InvalidTimezone] if the configured timezone is unknown.
    ///
    /// Storage problems are not errors here, see [select_backend].
    pub async fn initialize(config: &Config) -> Result<Self, Error> {
        let currency = CurrencyFormatter::new(&config.currency_symbol)?;
        local_offset(&config.timezone)?;

        let storage = select_backend(config);
        let theme = ThemePreference::load(storage.key_value.clone()).await;

        tracing::info!("using the {} backend", storage.mode);

        Ok(Self {
            storage_mode: storage.mode,
            transactions: storage.transactions,
            theme,
            currency,
            local_timezone: config.timezone.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use time::macros::datetime;

    use crate::{
        Error,
        backend::StorageMode,
        config::Config,
        theme::ThemeMode,
        timezone::format_local_datetime,
        transaction::{Transaction, TransactionType, summarize},
    };

    use super::AppContext;

    #[tokio::test]
    async fn initializes_with_defaults() {
        let temp_dir = tempdir().unwrap();

        let context = AppContext::initialize(&Config::with_data_dir(temp_dir.path()))
            .await
            .unwrap();

        assert_eq!(context.storage_mode, StorageMode::Relational);
        assert_eq!(context.theme.mode().await, ThemeMode::Light);
        assert_eq!(context.currency.symbol(), "৳");
        assert_eq!(context.local_timezone, "Asia/Dhaka");
    }

    #[tokio::test]
    async fn rejects_unknown_timezone() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            timezone: "Nowhere/Special".to_owned(),
            ..Config::with_data_dir(temp_dir.path())
        };

        let result = AppContext::initialize(&config).await;

        assert!(matches!(result, Err(Error::InvalidTimezone(_))));
    }

    #[tokio::test]
    async fn theme_persists_between_contexts() {
        let temp_dir = tempdir().unwrap();
        let config = Config::with_data_dir(temp_dir.path());

        let context = AppContext::initialize(&config).await.unwrap();
        context.theme.toggle().await;
        drop(context);

        let context = AppContext::initialize(&config).await.unwrap();
        assert_eq!(context.theme.mode().await, ThemeMode::Dark);
    }

    #[tokio::test]
    async fn home_screen_flow() {
        let temp_dir = tempdir().unwrap();
        let context = AppContext::initialize(&Config::with_data_dir(temp_dir.path()))
            .await
            .unwrap();

        let salary = context
            .transactions
            .create_transaction(Transaction::build(
                100.0,
                datetime!(2024-01-01 0:00 UTC),
                "Salary",
                TransactionType::Income,
            ))
            .await
            .unwrap();
        context
            .transactions
            .create_transaction(Transaction::build(
                40.0,
                datetime!(2024-01-02 0:00 UTC),
                "Lunch",
                TransactionType::Expense,
            ))
            .await
            .unwrap();

        let summary = summarize(&context.transactions.list_transactions().await.unwrap());

        assert_eq!(context.currency.format(summary.balance), "৳60.00");
        assert_eq!(context.currency.format_signed(&salary), "+৳100.00");
        assert_eq!(
            format_local_datetime(salary.date, &context.local_timezone),
            Ok("1 Jan 2024, 06:00:00 AM".to_owned())
        );
    }
}

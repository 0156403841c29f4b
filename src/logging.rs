//! Installs the global tracing subscriber.

use std::{fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::Error;

/// Log `INFO` and above to stdout, and everything from `DEBUG` up to
/// `log_file` if one is given.
///
/// The stdout level can be changed with the `RUST_LOG` environment variable,
/// e.g. `RUST_LOG=finance_tracker=debug`.
///
/// The log file is appended to and created if it does not exist.
///
/// # Errors
/// Returns [Error::Io] if the log file cannot be opened. Calling this more
/// than once per process leaves the first subscriber in place.
pub fn setup_logging(log_file: Option<&Path>) -> Result<(), Error> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter(std::env::var("RUST_LOG").ok().as_deref()));

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    if tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .try_init()
        .is_err()
    {
        tracing::debug!("a global tracing subscriber is already installed");
    }

    Ok(())
}

/// Build the stdout filter from `directives`, falling back to `INFO` when
/// they are missing or cannot be parsed.
fn stdout_filter(directives: Option<&str>) -> EnvFilter {
    let default = || EnvFilter::new(filter::LevelFilter::INFO.to_string());

    match directives {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|error| {
            eprintln!("ignoring invalid RUST_LOG \"{directives}\": {error}");
            default()
        }),
        None => default(),
    }
}

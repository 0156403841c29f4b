//! Contains the SQLite backed store and the function that opens the
//! database file.

mod transaction;

pub use transaction::RelationalTransactionStore;

use std::path::Path;

use rusqlite::Connection;

use crate::Error;

/// Open the SQLite database at `path` and check that it is usable.
///
/// SQLite opens files lazily, so a cheap query is run to make sure the file
/// is actually a database that can be read. The parent directory is created
/// if it does not exist.
///
/// # Errors
/// This function will return a:
/// - [Error::Io] if the parent directory cannot be created,
/// - or [Error::SqlError] if the database cannot be opened or read.
pub fn open_database(path: &Path) -> Result<Connection, Error> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let connection = Connection::open(path).map_err(Error::SqlError)?;
    connection
        .query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map_err(Error::SqlError)?;

    Ok(connection)
}

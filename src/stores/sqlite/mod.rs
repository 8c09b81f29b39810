//! SQLite backed implementations of the stores.

pub mod record;
pub mod settings;

pub use record::SQLiteRecordStore;
pub use settings::SQLiteSettingsStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// Prepares `db_connection` and creates both stores on top of it.
///
/// This function will modify the database by adding the tables for records
/// and settings documents if they do not exist yet.
pub fn create_stores(
    db_connection: Connection,
) -> Result<(SQLiteRecordStore, SQLiteSettingsStore), Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok((
        SQLiteRecordStore::new(connection.clone()),
        SQLiteSettingsStore::new(connection),
    ))
}

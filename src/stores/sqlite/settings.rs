//! Implements a SQLite backed settings document store.
use std::sync::{Arc, Mutex};

use rusqlite::OptionalExtension;
use serde_json::Value;

use crate::{Error, db::CreateTable, stores::SettingsStore};

/// Reads and writes JSON settings documents by key.
#[derive(Debug, Clone)]
pub struct SQLiteSettingsStore {
    connection: Arc<Mutex<rusqlite::Connection>>,
}

impl SQLiteSettingsStore {
    /// Create a new store from the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<rusqlite::Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteSettingsStore {
    fn create_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS settings_document (
                key TEXT PRIMARY KEY,
                document TEXT NOT NULL
            )",
            (),
        )?;

        Ok(())
    }
}

impl SettingsStore for SQLiteSettingsStore {
    async fn read_settings(&self, key: &str) -> Result<Option<Value>, Error> {
        let document: Option<String> = self
            .connection
            .lock()
            .map_err(|_| Error::LockError("database"))?
            .query_row(
                "SELECT document FROM settings_document WHERE key = :key",
                &[(":key", key)],
                |row| row.get(0),
            )
            .optional()?;

        document
            .map(|text| {
                serde_json::from_str(&text)
                    .map_err(|error| Error::MalformedSettings(error.to_string()))
            })
            .transpose()
    }

    async fn write_settings(&self, key: &str, document: Value) -> Result<(), Error> {
        let text = serde_json::to_string(&document)?;

        self.connection
            .lock()
            .map_err(|_| Error::LockError("database"))?
            .execute(
                "INSERT INTO settings_document (key, document) VALUES (?1, ?2)
                    ON CONFLICT(key) DO UPDATE SET document = excluded.document",
                (key, text),
            )?;

        Ok(())
    }
}

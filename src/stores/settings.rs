//! Defines the store for settings documents.

use std::future::Future;

use serde_json::Value;

use crate::Error;

/// A key-value store holding settings documents.
///
/// Both operations may suspend and either succeed or fail as a whole.
pub trait SettingsStore: Send + Sync + 'static {
    /// Read the document stored under `key`, or `None` if there is no such document.
    fn read_settings(&self, key: &str)
    -> impl Future<Output = Result<Option<Value>, Error>> + Send;

    /// Store `document` under `key`, replacing any existing document.
    fn write_settings(
        &self,
        key: &str,
        document: Value,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

//! Defines the crate level error type.

use crate::settings::LoadState;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A negative amount was used to create a record.
    ///
    /// Amounts are magnitudes, whether money came in or went out is recorded
    /// by the record's kind.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(String),

    /// A record kind other than "income" or "expense" was read.
    #[error("\"{0}\" is not a valid record kind")]
    InvalidRecordKind(String),

    /// A budget alert threshold outside of 0-100 percent was given.
    #[error("alert threshold must be between 0 and 100 percent, got {0}")]
    InvalidAlertThreshold(u8),

    /// An aggregation was requested over zero buckets.
    #[error("the aggregation window must contain at least one bucket")]
    EmptyWindow,

    /// An aggregation window reached back past the earliest representable date.
    #[error("the aggregation window extends past the earliest supported date")]
    WindowOutOfRange,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The settings document read from the store does not have the expected shape.
    #[error("malformed settings document: {0}")]
    MalformedSettings(String),

    /// The settings store could not complete a read or write.
    ///
    /// The whole operation is considered to have failed, no fields are
    /// partially applied.
    #[error("settings store error: {0}")]
    SettingsStore(String),

    /// A settings load was requested after the settings were already loaded.
    #[error("cannot load settings while they are {0:?}")]
    LoadNotPermitted(LoadState),

    /// A newer settings load was started before this one finished, so this
    /// load's outcome was discarded.
    #[error("the settings load was superseded by a newer load")]
    LoadSuperseded,

    /// The requested record was not found.
    #[error("the requested record could not be found")]
    NotFound,

    /// Tried to delete a record that does not exist
    #[error("tried to delete a record that is not in the database")]
    DeleteMissingRecord,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire a lock on shared state.
    #[error("could not acquire the {0} lock")]
    LockError(&'static str),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

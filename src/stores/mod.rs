//! Contains traits and implementations for the stores that hold records and settings documents.

mod record;
mod settings;

pub mod sqlite;

pub use record::RecordStore;
pub use settings::SettingsStore;

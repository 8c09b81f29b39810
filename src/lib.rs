//! Tallybook is the core of a personal finance tracker.
//!
//! Income and expense records are summed into fixed-length series of day, week
//! or month buckets for charting, and the user's settings are loaded from and
//! saved back to a settings store without ever overwriting a stored document
//! that has not been read yet.

pub mod aggregation;
pub mod config;
mod db;
mod error;
pub mod ledger;
mod logging;
pub mod period;
pub mod record;
pub mod settings;
pub mod stores;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use aggregation::{
    Bucket, BudgetAlert, BudgetStatus, CategoryShare, Totals, aggregate, budget_status,
    display_max, expense_by_category, period_total, previous_average, summarize,
};
pub use config::SyncConfig;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use ledger::record_transaction;
pub use logging::init_logging;
pub use period::Granularity;
pub use record::{CategoryName, FinancialRecord, NewRecord, RecordId, RecordKind};
pub use settings::{
    BudgetSettings, LoadState, PersistStatus, SettingsState, SettingsSynchronizer,
    SettingsUpdate,
};
pub use timezone::{get_local_offset, now_in_timezone};

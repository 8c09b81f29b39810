//! The user's settings and how they are kept in sync with the settings store.

mod document;
mod state;
mod synchronizer;

pub use document::{BudgetDocument, SettingsDocument};
pub use state::{
    BudgetSettings, DARK_MODE_TOGGLE, DEFAULT_CATEGORIES, LoadState, SettingsState,
    SettingsUpdate,
};
pub use synchronizer::{PersistStatus, SettingsSynchronizer};

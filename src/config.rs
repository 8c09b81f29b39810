//! Configuration for keeping settings in sync with the settings store.

use std::time::Duration;

/// How long the settings must go without changes before they are written.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// The key the settings document is stored under.
pub const DEFAULT_SETTINGS_KEY: &str = "user_settings";

/// Controls how [SettingsSynchronizer](crate::settings::SettingsSynchronizer)
/// persists settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// The quiet period that must pass after the last change before a write is made.
    pub debounce: Duration,

    /// The key of the settings document in the settings store.
    pub settings_key: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            settings_key: DEFAULT_SETTINGS_KEY.to_owned(),
        }
    }
}

impl SyncConfig {
    /// Use `settings_key` instead of [DEFAULT_SETTINGS_KEY], e.g. one key per user.
    pub fn with_settings_key(mut self, settings_key: &str) -> Self {
        self.settings_key = settings_key.to_owned();
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

//! The JSON document the settings are stored as.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Error,
    record::CategoryName,
    settings::state::{
        BudgetSettings, SettingsState, clamp_alert_threshold, dedup_categories,
    },
};

/// The stored form of [SettingsState].
///
/// Every field may be missing from a stored document, e.g. one written by an
/// older version of the app. Missing fields keep their defaults when loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_toggles: Option<BTreeMap<String, bool>>,
}

/// The stored form of [BudgetSettings].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Wider than the in-app type so out-of-range values can be clamped.
    pub alert_threshold_percent: Option<u64>,
}

impl SettingsDocument {
    /// Read a document from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [Error::MalformedSettings] if `value` is not an object of the
    /// expected shape.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        serde_json::from_value(value).map_err(|error| Error::MalformedSettings(error.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        serde_json::to_value(self).map_err(Error::from)
    }

    /// Build settings from the built-in defaults, overwritten by every field
    /// present in this document.
    ///
    /// The returned settings keep the default load state.
    pub fn to_settings(&self) -> SettingsState {
        let mut settings = SettingsState::default();

        if let Some(categories) = &self.categories {
            settings.categories = dedup_categories(
                categories
                    .iter()
                    .filter_map(|name| CategoryName::new(name).ok())
                    .collect(),
            );
        }

        if let Some(budget) = &self.budget {
            if let Some(enabled) = budget.enabled {
                settings.budget.enabled = enabled;
            }
            if let Some(limit) = budget.limit {
                settings.budget.limit = limit;
            }
            if let Some(percent) = budget.alert_threshold_percent {
                settings.budget.alert_threshold_percent = clamp_alert_threshold(percent);
            }
        }

        if let Some(display_name) = &self.display_name {
            settings.display_name = display_name.clone();
        }

        if let Some(visual_toggles) = &self.visual_toggles {
            settings.visual_toggles = visual_toggles.clone();
        }

        settings
    }
}

impl From<&BudgetSettings> for BudgetDocument {
    fn from(budget: &BudgetSettings) -> Self {
        Self {
            enabled: Some(budget.enabled),
            limit: Some(budget.limit),
            alert_threshold_percent: Some(u64::from(budget.alert_threshold_percent)),
        }
    }
}

impl From<&SettingsState> for SettingsDocument {
    fn from(settings: &SettingsState) -> Self {
        Self {
            categories: Some(
                settings
                    .categories
                    .iter()
                    .map(|category| category.to_string())
                    .collect(),
            ),
            budget: Some(BudgetDocument::from(&settings.budget)),
            display_name: Some(settings.display_name.clone()),
            visual_toggles: Some(settings.visual_toggles.clone()),
        }
    }
}

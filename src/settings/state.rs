//! The user's preferences and the updates that can be applied to them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, record::CategoryName};

/// The categories offered before the user has created any of their own.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Food",
    "Transport",
    "Shopping",
    "Utilities",
    "Salary",
    "Rent",
    "Entertainment",
    "Other",
];

/// The visual toggle for the dark colour scheme.
pub const DARK_MODE_TOGGLE: &str = "dark_mode";

const DEFAULT_BUDGET_LIMIT: i64 = 10_000;
const DEFAULT_ALERT_THRESHOLD_PERCENT: u8 = 80;
const MAX_ALERT_THRESHOLD_PERCENT: u8 = 100;

/// Where the settings are in their load lifecycle.
///
/// Remote writes are only allowed once the settings are [LoadState::Loaded].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    LoadFailed,
}

/// Monthly spending budget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSettings {
    pub enabled: bool,
    pub limit: Decimal,
    /// The share of `limit` at which to start warning, between 0 and 100.
    pub alert_threshold_percent: u8,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: Decimal::from(DEFAULT_BUDGET_LIMIT),
            alert_threshold_percent: DEFAULT_ALERT_THRESHOLD_PERCENT,
        }
    }
}

/// A single change to [SettingsState].
///
/// All changes to the settings go through
/// [SettingsSynchronizer::update_field](crate::settings::SettingsSynchronizer::update_field)
/// with one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsUpdate {
    DisplayName(String),
    Budget(BudgetSettings),
    BudgetEnabled(bool),
    BudgetLimit(Decimal),
    AlertThreshold(u8),
    VisualToggle(String, bool),
    /// Replace the whole category list. Duplicates are dropped, keeping the
    /// first occurrence.
    Categories(Vec<CategoryName>),
    AddCategory(CategoryName),
    RemoveCategory(CategoryName),
    /// A record was created with this category.
    ///
    /// Unknown categories are added to the front of the list.
    CategoryUsed(CategoryName),
}

/// The user's preferences plus where they are in the load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    /// Most recently added first, no duplicates.
    pub categories: Vec<CategoryName>,
    pub budget: BudgetSettings,
    /// Only used for labelling, never validated.
    pub display_name: String,
    pub visual_toggles: BTreeMap<String, bool>,
    pub load_state: LoadState,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|name| CategoryName::new_unchecked(name))
                .collect(),
            budget: BudgetSettings::default(),
            display_name: String::new(),
            visual_toggles: BTreeMap::from([(DARK_MODE_TOGGLE.to_owned(), false)]),
            load_state: LoadState::NotLoaded,
        }
    }
}

impl SettingsState {
    /// Apply `update` to the settings.
    ///
    /// Returns whether the settings changed.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAlertThreshold] if an alert threshold above 100
    /// percent is given, in which case the settings are left as they were.
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<bool, Error> {
        let changed = match update {
            SettingsUpdate::DisplayName(name) => replace(&mut self.display_name, name),
            SettingsUpdate::Budget(budget) => {
                validate_alert_threshold(budget.alert_threshold_percent)?;
                replace(&mut self.budget, budget)
            }
            SettingsUpdate::BudgetEnabled(enabled) => replace(&mut self.budget.enabled, enabled),
            SettingsUpdate::BudgetLimit(limit) => replace(&mut self.budget.limit, limit),
            SettingsUpdate::AlertThreshold(percent) => {
                validate_alert_threshold(percent)?;
                replace(&mut self.budget.alert_threshold_percent, percent)
            }
            SettingsUpdate::VisualToggle(name, enabled) => {
                self.visual_toggles.insert(name, enabled) != Some(enabled)
            }
            SettingsUpdate::Categories(categories) => {
                replace(&mut self.categories, dedup_categories(categories))
            }
            SettingsUpdate::AddCategory(category) | SettingsUpdate::CategoryUsed(category) => {
                self.push_front_category(category)
            }
            SettingsUpdate::RemoveCategory(category) => {
                let count = self.categories.len();
                self.categories.retain(|existing| *existing != category);
                self.categories.len() != count
            }
        };

        Ok(changed)
    }

    fn push_front_category(&mut self, category: CategoryName) -> bool {
        if self.categories.contains(&category) {
            false
        } else {
            self.categories.insert(0, category);
            true
        }
    }
}

/// Drop repeated categories, keeping the first occurrence of each.
pub(crate) fn dedup_categories(categories: Vec<CategoryName>) -> Vec<CategoryName> {
    let mut unique: Vec<CategoryName> = Vec::with_capacity(categories.len());

    for category in categories {
        if !unique.contains(&category) {
            unique.push(category);
        }
    }

    unique
}

/// Clamp a threshold read from an untrusted source into range.
pub(crate) fn clamp_alert_threshold(percent: u64) -> u8 {
    u8::try_from(percent)
        .unwrap_or(MAX_ALERT_THRESHOLD_PERCENT)
        .min(MAX_ALERT_THRESHOLD_PERCENT)
}

fn validate_alert_threshold(percent: u8) -> Result<(), Error> {
    if percent > MAX_ALERT_THRESHOLD_PERCENT {
        Err(Error::InvalidAlertThreshold(percent))
    } else {
        Ok(())
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

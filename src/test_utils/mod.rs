#![allow(missing_docs)]

pub(crate) mod records;
pub(crate) mod settings_store;

pub(crate) use records::{expense, income, record_at};
pub(crate) use settings_store::FakeSettingsStore;

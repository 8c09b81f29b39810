//! Creating transactions, which touches both the record store and the settings.

use crate::{
    Error,
    record::{FinancialRecord, NewRecord},
    settings::{SettingsSynchronizer, SettingsUpdate},
    stores::{RecordStore, SettingsStore},
};

/// Save `new_record` and report its category as used.
///
/// A category the user has not used before is added to the front of their
/// category list, which is persisted like any other settings change.
///
/// # Errors
///
/// Returns any error from the record store, in which case the settings are
/// not touched.
pub fn record_transaction<R, S>(
    record_store: &mut R,
    settings: &SettingsSynchronizer<S>,
    new_record: NewRecord,
) -> Result<FinancialRecord, Error>
where
    R: RecordStore,
    S: SettingsStore,
{
    let record = record_store.create(new_record)?;
    settings.update_field(SettingsUpdate::CategoryUsed(record.category.clone()))?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use serde_json::json;
    use tokio::time::sleep;

    use crate::{
        config::SyncConfig,
        db::CreateTable,
        record::{CategoryName, NewRecord, RecordKind},
        settings::SettingsSynchronizer,
        stores::{RecordStore, sqlite::SQLiteRecordStore},
        test_utils::FakeSettingsStore,
    };

    use super::record_transaction;

    fn get_record_store() -> SQLiteRecordStore {
        let connection = Connection::open_in_memory().unwrap();
        SQLiteRecordStore::create_table(&connection).unwrap();

        SQLiteRecordStore::new(Arc::new(Mutex::new(connection)))
    }

    fn new_expense(category: &str) -> NewRecord {
        NewRecord::new(
            Decimal::from(12),
            RecordKind::Expense,
            CategoryName::new_unchecked(category),
            "2024-01-15",
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn new_category_is_added_and_persisted() {
        let mut records = get_record_store();
        let settings_store = FakeSettingsStore::with_document(json!({}));
        let settings = SettingsSynchronizer::new(settings_store.clone(), SyncConfig::default());
        settings.load().await.unwrap();

        let record = record_transaction(&mut records, &settings, new_expense("Pets")).unwrap();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(records.get_all().unwrap(), vec![record]);
        assert_eq!(
            settings.snapshot().unwrap().categories[0],
            CategoryName::new_unchecked("Pets")
        );
        let writes = settings_store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0]["categories"][0], "Pets");
    }

    #[tokio::test(start_paused = true)]
    async fn known_category_does_not_write_settings() {
        let mut records = get_record_store();
        let settings_store = FakeSettingsStore::with_document(json!({}));
        let settings = SettingsSynchronizer::new(settings_store.clone(), SyncConfig::default());
        settings.load().await.unwrap();
        let categories = settings.snapshot().unwrap().categories;

        record_transaction(&mut records, &settings, new_expense("Rent")).unwrap();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(settings.snapshot().unwrap().categories, categories);
        assert!(settings_store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn record_before_settings_load_is_kept_without_writing_settings() {
        let mut records = get_record_store();
        let settings_store = FakeSettingsStore::default();
        let settings = SettingsSynchronizer::new(settings_store.clone(), SyncConfig::default());

        record_transaction(&mut records, &settings, new_expense("Pets")).unwrap();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(records.get_all().unwrap().len(), 1);
        assert!(settings_store.writes().is_empty());
    }
}

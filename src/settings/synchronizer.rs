//! Keeps the user's settings in sync with the settings store.
//!
//! Settings are loaded once, after which every change is written back once the
//! settings have been left alone for the configured debounce period. Nothing
//! is written until a load has succeeded, so the defaults held before a load
//! can never replace a stored document that has not been read yet.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{
    sync::{Mutex as AsyncMutex, oneshot, watch},
    task::JoinHandle,
};

use crate::{
    Error,
    config::SyncConfig,
    settings::{
        document::SettingsDocument,
        state::{LoadState, SettingsState, SettingsUpdate},
    },
    stores::SettingsStore,
};

/// The most recent thing that happened to the stored copy of the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    /// No write has been scheduled yet.
    Idle,
    /// A write is waiting for the debounce period to pass.
    Pending,
    Writing,
    /// The last write succeeded.
    Synced,
    /// The last write failed. Local settings are kept and written again on
    /// the next change.
    WriteFailed(String),
}

/// Owns the user's settings for a session and persists changes to a [SettingsStore].
///
/// All methods take `&self`, the synchronizer can be shared by reference
/// between the code that loads the settings and the code that edits them.
/// Methods that schedule writes must be called from within a tokio runtime.
///
/// Dropping the synchronizer cancels a write that is still waiting for its
/// debounce period, see [SettingsSynchronizer::shutdown].
pub struct SettingsSynchronizer<S: SettingsStore> {
    config: SyncConfig,
    writer: DocumentWriter<S>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: SettingsState,
    /// Incremented by every load so that only the latest load is applied.
    load_generation: u64,
    pending: Option<PendingPersist>,
}

/// A write waiting for its debounce period.
struct PendingPersist {
    cancel: oneshot::Sender<()>,
    document: SettingsDocument,
    handle: JoinHandle<Result<(), Error>>,
}

impl<S: SettingsStore> SettingsSynchronizer<S> {
    /// Create a synchronizer holding the default settings, nothing is read
    /// from `store` until [SettingsSynchronizer::load] is called.
    pub fn new(store: S, config: SyncConfig) -> Self {
        let (status, _) = watch::channel(PersistStatus::Idle);

        Self {
            writer: DocumentWriter {
                store: Arc::new(store),
                key: config.settings_key.clone(),
                write_lock: Arc::new(AsyncMutex::new(())),
                status: Arc::new(status),
            },
            config,
            inner: Mutex::new(Inner {
                state: SettingsState::default(),
                load_generation: 0,
                pending: None,
            }),
        }
    }

    pub fn load_state(&self) -> Result<LoadState, Error> {
        Ok(self.lock()?.state.load_state)
    }

    /// A copy of the current settings, including changes that have not been
    /// written yet.
    pub fn snapshot(&self) -> Result<SettingsState, Error> {
        Ok(self.lock()?.state.clone())
    }

    /// Watch the status of writes to the settings store.
    pub fn subscribe(&self) -> watch::Receiver<PersistStatus> {
        self.writer.status.subscribe()
    }

    /// Load the settings from the store.
    ///
    /// If the store holds a settings document, its fields replace the
    /// defaults and fields it lacks keep their defaults. If there is no
    /// document, a document with the default settings is written first. Either
    /// way, changes made before the load finished are replaced.
    ///
    /// A failed load can be retried by calling this function again.
    ///
    /// # Errors
    ///
    /// - [Error::LoadNotPermitted] if the settings are already loaded.
    /// - [Error::LoadSuperseded] if another load was started before this one finished.
    /// - [Error::MalformedSettings] if the stored document has the wrong shape.
    /// - Any error from the store.
    ///
    /// The settings are left untouched and moved to [LoadState::LoadFailed]
    /// on a malformed document or a store error.
    pub async fn load(&self) -> Result<(), Error> {
        let generation = self.begin_load()?;
        let outcome = self.read_or_provision(generation).await;
        self.finish_load(generation, outcome)
    }

    /// Apply `update` to the settings.
    ///
    /// The change is visible immediately in any load state, but a write is
    /// only scheduled once the settings are loaded and only if `update`
    /// changed something. Each scheduled write replaces any write still
    /// waiting for its debounce period, so a burst of changes produces a
    /// single write of the final settings.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAlertThreshold] for thresholds above 100 percent.
    pub fn update_field(&self, update: SettingsUpdate) -> Result<(), Error> {
        let mut inner = self.lock()?;

        if !inner.state.apply(update)? {
            return Ok(());
        }

        if inner.state.load_state != LoadState::Loaded {
            tracing::debug!(
                "settings changed while {:?}, the change will not be saved",
                inner.state.load_state
            );
            return Ok(());
        }

        let document = SettingsDocument::from(&inner.state);
        self.schedule_persist(&mut inner, document);

        Ok(())
    }

    /// Write a pending change now instead of waiting for the debounce period.
    ///
    /// Does nothing if no write is pending. If the pending write has already
    /// started, waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns the error from the settings store if the write failed.
    pub async fn flush(&self) -> Result<(), Error> {
        let pending = self.lock()?.pending.take();

        let Some(pending) = pending else {
            return Ok(());
        };

        if pending.cancel.send(()).is_ok() {
            tracing::debug!("flushing pending settings write");
            self.writer.write(&pending.document).await
        } else {
            pending
                .handle
                .await
                .map_err(|error| Error::SettingsStore(error.to_string()))?
        }
    }

    /// Cancel a write that is waiting for its debounce period.
    ///
    /// A write that has already started is not interrupted.
    pub fn shutdown(&self) {
        let pending = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .take();

        if let Some(pending) = pending
            && pending.cancel.send(()).is_ok()
        {
            tracing::debug!("cancelled pending settings write");
            self.writer.status.send_replace(PersistStatus::Idle);
        }
    }

    fn begin_load(&self) -> Result<u64, Error> {
        let mut inner = self.lock()?;

        match inner.state.load_state {
            LoadState::Loaded => return Err(Error::LoadNotPermitted(LoadState::Loaded)),
            LoadState::Loading => tracing::debug!("superseding unfinished settings load"),
            LoadState::NotLoaded | LoadState::LoadFailed => {}
        }

        inner.state.load_state = LoadState::Loading;
        inner.load_generation += 1;
        tracing::debug!("loading settings document \"{}\"", self.config.settings_key);

        Ok(inner.load_generation)
    }

    async fn read_or_provision(&self, generation: u64) -> Result<SettingsDocument, Error> {
        let key = &self.config.settings_key;

        match self.writer.store.read_settings(key).await? {
            Some(value) => SettingsDocument::from_value(value),
            None => {
                let document = SettingsDocument::from(&SettingsState::default());

                // Held for the whole write so later debounced writes land after it.
                let _write_guard = self.writer.write_lock.lock().await;
                if self.lock()?.load_generation != generation {
                    tracing::debug!("superseded settings load skipped writing the defaults");
                    return Err(Error::LoadSuperseded);
                }

                tracing::info!("no settings document \"{key}\" found, saving the defaults");
                self.writer
                    .store
                    .write_settings(key, document.to_value()?)
                    .await?;

                Ok(document)
            }
        }
    }

    fn finish_load(
        &self,
        generation: u64,
        outcome: Result<SettingsDocument, Error>,
    ) -> Result<(), Error> {
        let mut inner = self.lock()?;

        if inner.load_generation != generation {
            tracing::debug!("discarding the outcome of a superseded settings load");
            return Err(Error::LoadSuperseded);
        }

        match outcome {
            Ok(document) => {
                let mut state = document.to_settings();
                state.load_state = LoadState::Loaded;
                inner.state = state;
                tracing::info!("loaded settings document \"{}\"", self.config.settings_key);

                Ok(())
            }
            Err(error) => {
                inner.state.load_state = LoadState::LoadFailed;
                tracing::error!(
                    "could not load settings document \"{}\": {error}",
                    self.config.settings_key
                );

                Err(error)
            }
        }
    }

    fn schedule_persist(&self, inner: &mut Inner, document: SettingsDocument) {
        if let Some(previous) = inner.pending.take() {
            // Fails if the previous write already started, which is left to finish.
            let _ = previous.cancel.send(());
        }

        let (cancel, cancelled) = oneshot::channel();
        let handle = tokio::spawn(persist_after_delay(
            self.writer.clone(),
            document.clone(),
            self.config.debounce,
            cancelled,
        ));

        tracing::debug!(
            "settings write scheduled in {}ms",
            self.config.debounce.as_millis()
        );
        self.writer.status.send_replace(PersistStatus::Pending);

        inner.pending = Some(PendingPersist {
            cancel,
            document,
            handle,
        });
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, Error> {
        self.inner.lock().map_err(|_| Error::LockError("settings"))
    }
}

impl<S: SettingsStore> Drop for SettingsSynchronizer<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Writes settings documents one at a time.
struct DocumentWriter<S: SettingsStore> {
    store: Arc<S>,
    key: String,
    /// Held for the duration of a write so writes reach the store in the order they started.
    write_lock: Arc<AsyncMutex<()>>,
    status: Arc<watch::Sender<PersistStatus>>,
}

impl<S: SettingsStore> Clone for DocumentWriter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            write_lock: Arc::clone(&self.write_lock),
            status: Arc::clone(&self.status),
        }
    }
}

impl<S: SettingsStore> DocumentWriter<S> {
    async fn write(&self, document: &SettingsDocument) -> Result<(), Error> {
        let _write_guard = self.write_lock.lock().await;
        self.status.send_replace(PersistStatus::Writing);

        let result = match document.to_value() {
            Ok(value) => self.store.write_settings(&self.key, value).await,
            Err(error) => Err(error),
        };

        match &result {
            Ok(()) => {
                tracing::info!("saved settings document \"{}\"", self.key);
                self.status.send_replace(PersistStatus::Synced);
            }
            Err(error) => {
                tracing::error!("could not save settings document \"{}\": {error}", self.key);
                self.status
                    .send_replace(PersistStatus::WriteFailed(error.to_string()));
            }
        }

        result
    }
}

async fn persist_after_delay<S: SettingsStore>(
    writer: DocumentWriter<S>,
    document: SettingsDocument,
    delay: std::time::Duration,
    cancelled: oneshot::Receiver<()>,
) -> Result<(), Error> {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = cancelled => {
            tracing::debug!("pending settings write replaced or cancelled");
            return Ok(());
        }
    }

    writer.write(&document).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use tokio::time::sleep;

    use crate::{
        Error,
        config::SyncConfig,
        record::CategoryName,
        settings::{
            LoadState, PersistStatus, SettingsDocument, SettingsSynchronizer, SettingsUpdate,
        },
        test_utils::FakeSettingsStore,
    };

    const DEBOUNCE: Duration = Duration::from_millis(1000);

    fn synchronizer(store: &FakeSettingsStore) -> SettingsSynchronizer<FakeSettingsStore> {
        SettingsSynchronizer::new(
            store.clone(),
            SyncConfig::default().with_debounce(DEBOUNCE),
        )
    }

    async fn loaded_synchronizer(
        store: &FakeSettingsStore,
    ) -> SettingsSynchronizer<FakeSettingsStore> {
        let sync = synchronizer(store);
        sync.load().await.unwrap();
        sync
    }

    fn display_name_of(document: &Value) -> Option<&str> {
        document.get("display_name").and_then(Value::as_str)
    }

    async fn wait_until_loading(sync: &SettingsSynchronizer<FakeSettingsStore>) {
        while sync.load_state().unwrap() != LoadState::Loading {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn starts_not_loaded_with_defaults() {
        let store = FakeSettingsStore::default();
        let sync = synchronizer(&store);

        let state = sync.snapshot().unwrap();

        assert_eq!(state.load_state, LoadState::NotLoaded);
        assert_eq!(state.display_name, "");
        assert_eq!(*sync.subscribe().borrow(), PersistStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn updates_before_load_never_write() {
        let store = FakeSettingsStore::default();
        let sync = synchronizer(&store);

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        sync.update_field(SettingsUpdate::BudgetEnabled(true))
            .unwrap();
        sleep(DEBOUNCE * 5).await;

        assert!(store.writes().is_empty());
        assert_eq!(sync.snapshot().unwrap().display_name, "Alice");
    }

    #[tokio::test(start_paused = true)]
    async fn updates_during_load_are_discarded_and_defaults_provisioned() {
        let store = FakeSettingsStore::default().read_delay(Duration::from_millis(500));
        let sync = synchronizer(&store);

        let (loaded, writes_during_load) = tokio::join!(sync.load(), async {
            wait_until_loading(&sync).await;
            sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
                .unwrap();
            assert_eq!(sync.snapshot().unwrap().display_name, "Alice");
            store.writes().len()
        });

        loaded.unwrap();
        assert_eq!(writes_during_load, 0);

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(display_name_of(&writes[0]), Some(""));

        let state = sync.snapshot().unwrap();
        assert_eq!(state.load_state, LoadState::Loaded);
        assert_eq!(state.display_name, "");

        sleep(DEBOUNCE * 2).await;
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn load_adopts_stored_fields_without_writing() {
        let store = FakeSettingsStore::with_document(json!({
            "display_name": "Bob",
            "budget": { "enabled": true }
        }));

        let sync = loaded_synchronizer(&store).await;
        let state = sync.snapshot().unwrap();

        assert_eq!(state.display_name, "Bob");
        assert!(state.budget.enabled);
        assert_eq!(state.budget.alert_threshold_percent, 80);
        assert_eq!(state.categories[0], CategoryName::new_unchecked("Food"));
        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_document_fails_load_and_blocks_writes() {
        let store = FakeSettingsStore::with_document(json!({ "categories": 5 }));
        let sync = synchronizer(&store);

        let got = sync.load().await;

        assert!(matches!(got, Err(Error::MalformedSettings(_))));
        assert_eq!(sync.load_state().unwrap(), LoadState::LoadFailed);

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        sleep(DEBOUNCE * 3).await;

        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn read_failure_fails_load_and_leaves_settings_untouched() {
        let store = FakeSettingsStore::default();
        store.fail_reads(true);
        let sync = synchronizer(&store);
        sync.update_field(SettingsUpdate::DisplayName("Local".to_owned()))
            .unwrap();

        let got = sync.load().await;

        assert!(matches!(got, Err(Error::SettingsStore(_))));
        let state = sync.snapshot().unwrap();
        assert_eq!(state.load_state, LoadState::LoadFailed);
        assert_eq!(state.display_name, "Local");
        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_load_can_be_retried() {
        let store = FakeSettingsStore::with_document(json!({ "display_name": "Bob" }));
        store.fail_reads(true);
        let sync = synchronizer(&store);
        assert!(sync.load().await.is_err());

        store.fail_reads(false);
        sync.load().await.unwrap();

        assert_eq!(sync.load_state().unwrap(), LoadState::Loaded);
        assert_eq!(sync.snapshot().unwrap().display_name, "Bob");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_provisioning_write_fails_load() {
        let store = FakeSettingsStore::default();
        store.fail_writes(true);
        let sync = synchronizer(&store);

        assert!(sync.load().await.is_err());
        assert_eq!(sync.load_state().unwrap(), LoadState::LoadFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn load_twice_is_not_permitted() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        assert_eq!(
            sync.load().await,
            Err(Error::LoadNotPermitted(LoadState::Loaded))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn newer_load_supersedes_unfinished_load() {
        let store = FakeSettingsStore::with_document(json!({ "display_name": "Bob" }))
            .read_delay(Duration::from_millis(500));
        let sync = synchronizer(&store);

        let (first, second) = tokio::join!(sync.load(), async {
            wait_until_loading(&sync).await;
            sync.load().await
        });

        assert_eq!(first, Err(Error::LoadSuperseded));
        assert_eq!(second, Ok(()));
        assert_eq!(sync.load_state().unwrap(), LoadState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_load_does_not_write_defaults() {
        let store = FakeSettingsStore::default().read_delay(Duration::from_millis(500));
        let sync = synchronizer(&store);

        let (first, second) = tokio::join!(sync.load(), async {
            wait_until_loading(&sync).await;
            sync.load().await
        });

        assert_eq!(first, Err(Error::LoadSuperseded));
        assert_eq!(second, Ok(()));
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_default_write_never_overwrites_later_edits() {
        let store = FakeSettingsStore::default().first_write_delay(Duration::from_secs(10));
        let sync = synchronizer(&store);

        let (first, second) = tokio::join!(sync.load(), async {
            wait_until_loading(&sync).await;
            let loaded = sync.load().await;
            sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
                .unwrap();
            loaded
        });
        sleep(Duration::from_secs(20)).await;

        assert_eq!(first, Err(Error::LoadSuperseded));
        assert_eq!(second, Ok(()));
        assert_eq!(sync.snapshot().unwrap().display_name, "Alice");
        let writes = store.writes();
        assert_eq!(display_name_of(writes.last().unwrap()), Some("Alice"));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_updates_is_written_once_with_final_values() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        sync.update_field(SettingsUpdate::DisplayName("A".to_owned()))
            .unwrap();
        sleep(Duration::from_millis(300)).await;
        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        sleep(Duration::from_millis(300)).await;
        sync.update_field(SettingsUpdate::BudgetLimit(Decimal::new(500, 0)))
            .unwrap();
        sleep(Duration::from_millis(300)).await;
        sync.update_field(SettingsUpdate::CategoryUsed(CategoryName::new_unchecked(
            "Pets",
        )))
        .unwrap();

        sleep(Duration::from_millis(900)).await;
        assert!(store.writes().is_empty());

        sleep(Duration::from_millis(200)).await;
        let writes = store.writes();
        assert_eq!(writes.len(), 1);

        let written = SettingsDocument::from_value(writes[0].clone())
            .unwrap()
            .to_settings();
        assert_eq!(written.display_name, "Alice");
        assert_eq!(written.budget.limit, Decimal::new(500, 0));
        assert_eq!(written.categories[0], CategoryName::new_unchecked("Pets"));
        assert_eq!(*sync.subscribe().borrow(), PersistStatus::Synced);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_quiet_periods_write_separately() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        sleep(DEBOUNCE * 2).await;
        sync.update_field(SettingsUpdate::DisplayName("Bob".to_owned()))
            .unwrap();
        sleep(DEBOUNCE * 2).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(display_name_of(&writes[0]), Some("Alice"));
        assert_eq!(display_name_of(&writes[1]), Some("Bob"));
    }

    #[tokio::test(start_paused = true)]
    async fn update_without_change_schedules_nothing() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        sync.update_field(SettingsUpdate::CategoryUsed(CategoryName::new_unchecked(
            "Food",
        )))
        .unwrap();
        sleep(DEBOUNCE * 2).await;

        assert!(store.writes().is_empty());
        assert_eq!(*sync.subscribe().borrow(), PersistStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_update_is_rejected_without_write() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        let got = sync.update_field(SettingsUpdate::AlertThreshold(150));
        sleep(DEBOUNCE * 2).await;

        assert_eq!(got, Err(Error::InvalidAlertThreshold(150)));
        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_write() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        sync.shutdown();
        sleep(DEBOUNCE * 3).await;

        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_synchronizer_cancels_pending_write() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        drop(sync);
        sleep(DEBOUNCE * 3).await;

        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately_and_only_once() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        sync.flush().await.unwrap();

        assert_eq!(store.writes().len(), 1);

        sleep(DEBOUNCE * 3).await;
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_without_pending_write_does_nothing() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;

        sync.flush().await.unwrap();

        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_keeps_local_settings_and_retries_on_next_change() {
        let store = FakeSettingsStore::with_document(json!({}));
        let sync = loaded_synchronizer(&store).await;
        let status = sync.subscribe();
        store.fail_writes(true);

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        sleep(DEBOUNCE * 2).await;

        assert!(store.writes().is_empty());
        assert!(matches!(*status.borrow(), PersistStatus::WriteFailed(_)));
        assert_eq!(sync.snapshot().unwrap().display_name, "Alice");

        store.fail_writes(false);
        sync.update_field(SettingsUpdate::BudgetEnabled(true))
            .unwrap();
        sleep(DEBOUNCE * 2).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(display_name_of(&writes[0]), Some("Alice"));
        assert_eq!(*status.borrow(), PersistStatus::Synced);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_write_finishes_before_next_write() {
        let store =
            FakeSettingsStore::with_document(json!({})).write_delay(Duration::from_millis(500));
        let sync = loaded_synchronizer(&store).await;

        sync.update_field(SettingsUpdate::DisplayName("Alice".to_owned()))
            .unwrap();
        // The first write starts at 1000ms and finishes at 1500ms.
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(*sync.subscribe().borrow(), PersistStatus::Writing);
        sync.update_field(SettingsUpdate::DisplayName("Bob".to_owned()))
            .unwrap();
        sleep(DEBOUNCE * 3).await;

        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(display_name_of(&writes[0]), Some("Alice"));
        assert_eq!(display_name_of(&writes[1]), Some("Bob"));
    }
}

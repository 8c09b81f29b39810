//! An in-memory settings store with controllable latency and failures.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde_json::Value;

use crate::{Error, config::DEFAULT_SETTINGS_KEY, stores::SettingsStore};

#[derive(Debug, Default)]
struct FakeState {
    documents: HashMap<String, Value>,
    writes: Vec<Value>,
    fail_reads: bool,
    fail_writes: bool,
    first_write_delay: Option<Duration>,
}

/// Clones share the same documents, so a test can keep a clone to inspect
/// what a synchronizer wrote.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSettingsStore {
    state: Arc<Mutex<FakeState>>,
    read_delay: Duration,
    write_delay: Duration,
}

impl FakeSettingsStore {
    /// A store holding `document` under the default settings key.
    pub(crate) fn with_document(document: Value) -> Self {
        let store = Self::default();
        store
            .state
            .lock()
            .unwrap()
            .documents
            .insert(DEFAULT_SETTINGS_KEY.to_owned(), document);

        store
    }

    pub(crate) fn read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub(crate) fn write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// Delay only the first write, later writes use [FakeSettingsStore::write_delay].
    pub(crate) fn first_write_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().first_write_delay = Some(delay);
        self
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    /// Every successful write, oldest first.
    pub(crate) fn writes(&self) -> Vec<Value> {
        self.state.lock().unwrap().writes.clone()
    }
}

impl SettingsStore for FakeSettingsStore {
    async fn read_settings(&self, key: &str) -> Result<Option<Value>, Error> {
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }

        let state = self.state.lock().unwrap();

        if state.fail_reads {
            return Err(Error::SettingsStore("read failed".to_owned()));
        }

        Ok(state.documents.get(key).cloned())
    }

    async fn write_settings(&self, key: &str, document: Value) -> Result<(), Error> {
        let delay = self
            .state
            .lock()
            .unwrap()
            .first_write_delay
            .take()
            .unwrap_or(self.write_delay);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();

        if state.fail_writes {
            return Err(Error::SettingsStore("write failed".to_owned()));
        }

        state.writes.push(document.clone());
        state.documents.insert(key.to_owned(), document);

        Ok(())
    }
}

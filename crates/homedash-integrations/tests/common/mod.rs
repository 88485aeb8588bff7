#![allow(dead_code)]

use std::sync::Mutex;

use homedash_core::{Settings, SettingsSource, Snapshot, SnapshotSink, StoreError};
use homedash_integrations::{ApiClient, Clients, Endpoints};

/// In-memory settings source and snapshot sink.
#[derive(Default)]
pub struct MemoryStore {
    settings: Option<Settings>,
    fail_writes: bool,
    snapshots: Mutex<Vec<(Option<i64>, Snapshot)>>,
}

impl MemoryStore {
    pub fn with_settings(document: serde_json::Value) -> Self {
        Self {
            settings: Some(Settings::from_document(document).expect("valid settings document")),
            ..Self::default()
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn snapshots(&self) -> Vec<(Option<i64>, Snapshot)> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl SettingsSource for MemoryStore {
    async fn load_settings(&self, user_id: Option<i64>) -> Result<Settings, StoreError> {
        self.settings
            .clone()
            .ok_or(StoreError::SettingsNotFound { user_id })
    }
}

impl SnapshotSink for MemoryStore {
    async fn insert_snapshot(
        &self,
        user_id: Option<i64>,
        snapshot: &Snapshot,
    ) -> Result<i64, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Backend("write rejected".into()));
        }
        let mut rows = self.snapshots.lock().unwrap();
        rows.push((user_id, snapshot.clone()));
        Ok(i64::try_from(rows.len()).unwrap())
    }
}

pub fn clients(base_url: &str) -> Clients {
    Clients {
        api: ApiClient::with_endpoints(5, "homedash-test", &Endpoints::single(base_url))
            .expect("client construction should not fail"),
        cloudinary: None,
    }
}

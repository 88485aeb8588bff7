//! Storage seams the integration pipelines are written against.
//!
//! `homedash-db` implements both traits on top of Postgres; tests use
//! in-memory implementations.

use std::future::Future;

use thiserror::Error;

use crate::{Settings, Snapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no settings document found for {}", describe_user(.user_id))]
    SettingsNotFound { user_id: Option<i64> },

    #[error("stored settings document is invalid: {0}")]
    InvalidSettings(#[source] serde_json::Error),

    #[error("snapshot could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn describe_user(user_id: &Option<i64>) -> String {
    user_id.map_or_else(|| "global settings".to_string(), |id| format!("user {id}"))
}

/// Source of the settings document for a user.
pub trait SettingsSource: Send + Sync {
    /// Load the settings document for `user_id`, or the global document when
    /// `user_id` is `None`.
    fn load_settings(
        &self,
        user_id: Option<i64>,
    ) -> impl Future<Output = Result<Settings, StoreError>> + Send;
}

/// Append-only destination for finished snapshots.
pub trait SnapshotSink: Send + Sync {
    /// Insert `snapshot` as a new record and return its id once the write is
    /// acknowledged.
    fn insert_snapshot(
        &self,
        user_id: Option<i64>,
        snapshot: &Snapshot,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_not_found_names_the_owner() {
        let global = StoreError::SettingsNotFound { user_id: None };
        assert_eq!(
            global.to_string(),
            "no settings document found for global settings"
        );

        let user = StoreError::SettingsNotFound { user_id: Some(7) };
        assert_eq!(user.to_string(), "no settings document found for user 7");
    }
}

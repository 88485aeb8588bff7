//! Pipeline orchestration: load settings, fetch, transform, persist.
//!
//! [`run_pipeline`] returns a typed result for callers that want one (the
//! CLI). [`run_and_log`] is the entry point for scheduled runs: it logs any
//! failure exactly once and never propagates it.

use std::time::Instant;

use futures::future::join_all;
use homedash_core::{
    AppConfig, CloudinaryCredentials, Integration, Settings, SettingsSource, Snapshot,
    SnapshotSink,
};

use crate::client::ApiClient;
use crate::error::{ErrorKind, IntegrationError};
use crate::{feedly, goodreads, music, trakt};

/// Outbound clients and process-level credentials shared by every pipeline.
#[derive(Debug, Clone)]
pub struct Clients {
    pub api: ApiClient,
    pub cloudinary: Option<CloudinaryCredentials>,
}

impl Clients {
    /// # Errors
    ///
    /// Returns [`IntegrationError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, IntegrationError> {
        Ok(Self {
            api: ApiClient::from_app_config(config)?,
            cloudinary: config.cloudinary.clone(),
        })
    }
}

/// Result of one scheduled run, after logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Saved {
        integration: Integration,
        snapshot_id: i64,
    },
    Failed {
        integration: Integration,
        kind: ErrorKind,
        message: String,
    },
}

impl RunOutcome {
    #[must_use]
    pub fn integration(&self) -> Integration {
        match self {
            RunOutcome::Saved { integration, .. } | RunOutcome::Failed { integration, .. } => {
                *integration
            }
        }
    }

    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, RunOutcome::Saved { .. })
    }
}

/// Build a snapshot from already-loaded settings without persisting it.
///
/// # Errors
///
/// Returns the first config, remote, or shape failure.
pub async fn build_snapshot(
    clients: &Clients,
    settings: &Settings,
    integration: Integration,
) -> Result<Snapshot, IntegrationError> {
    let snapshot = match integration {
        Integration::Music => Snapshot::Music(music::collect(clients, settings).await?),
        Integration::Trakt => Snapshot::Trakt(trakt::collect(&clients.api, settings).await?),
        Integration::Feedly => Snapshot::Feedly(feedly::collect(settings)?),
        Integration::Goodreads => {
            Snapshot::Goodreads(goodreads::collect(&clients.api, settings).await?)
        }
    };
    Ok(snapshot)
}

/// Load settings and build a snapshot, without writing anything.
///
/// # Errors
///
/// Returns the first config, remote, or shape failure.
pub async fn collect<S: SettingsSource>(
    source: &S,
    clients: &Clients,
    integration: Integration,
    user_id: Option<i64>,
) -> Result<Snapshot, IntegrationError> {
    let settings = source
        .load_settings(user_id)
        .await
        .map_err(IntegrationError::LoadSettings)?;
    build_snapshot(clients, &settings, integration).await
}

/// Run one integration end to end and return the new snapshot id.
///
/// Nothing is written unless every earlier stage succeeded.
///
/// # Errors
///
/// Returns the first stage failure.
pub async fn run_pipeline<S>(
    store: &S,
    clients: &Clients,
    integration: Integration,
    user_id: Option<i64>,
) -> Result<i64, IntegrationError>
where
    S: SettingsSource + SnapshotSink,
{
    let snapshot = collect(store, clients, integration, user_id).await?;
    store
        .insert_snapshot(user_id, &snapshot)
        .await
        .map_err(IntegrationError::Persist)
}

/// Run one integration and log the outcome. Never fails.
pub async fn run_and_log<S>(
    store: &S,
    clients: &Clients,
    integration: Integration,
    user_id: Option<i64>,
) -> RunOutcome
where
    S: SettingsSource + SnapshotSink,
{
    let started = Instant::now();
    tracing::info!(%integration, ?user_id, "pipeline: starting run");

    match run_pipeline(store, clients, integration, user_id).await {
        Ok(snapshot_id) => {
            tracing::info!(
                %integration,
                snapshot_id,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "pipeline: snapshot saved"
            );
            RunOutcome::Saved {
                integration,
                snapshot_id,
            }
        }
        Err(e) => {
            let kind = e.kind();
            tracing::error!(%integration, %kind, error = %e, "pipeline: run failed");
            RunOutcome::Failed {
                integration,
                kind,
                message: e.to_string(),
            }
        }
    }
}

/// Run every integration concurrently; one failure does not affect the
/// others. Outcomes are returned in [`Integration::ALL`] order.
pub async fn run_all<S>(store: &S, clients: &Clients, user_id: Option<i64>) -> Vec<RunOutcome>
where
    S: SettingsSource + SnapshotSink,
{
    join_all(
        Integration::ALL
            .into_iter()
            .map(|integration| run_and_log(store, clients, integration, user_id)),
    )
    .await
}

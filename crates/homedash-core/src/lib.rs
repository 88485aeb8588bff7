//! Shared types for the homedash workspace.
//!
//! Holds the process configuration ([`AppConfig`]), the per-user settings
//! document read by the integration pipelines, the snapshot records they
//! produce, and the storage ports those pipelines are written against.

mod app_config;
mod config;
pub mod integration;
pub mod ports;
pub mod settings;
pub mod snapshots;

use thiserror::Error;

pub use app_config::{AppConfig, CloudinaryCredentials, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use integration::{Integration, UnknownIntegration};
pub use ports::{SettingsSource, SnapshotSink, StoreError};
pub use settings::{
    FeedlySettings, GoodreadsSettings, MusicSettings, Settings, SettingsError, TraktSettings,
};
pub use snapshots::{
    Book, FeedOutline, FeedlySnapshot, GoodreadsSnapshot, MusicSnapshot, RatedTitle, Snapshot,
    TopArtist, TraktEpisodeStats, TraktMovieStats, TraktRatingStats, TraktShowStats, TraktSnapshot,
    TraktStats,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

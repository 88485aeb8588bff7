//! The per-user settings document.
//!
//! Stored as one JSON object keyed by integration name. Pipelines only read
//! the sections they know about; anything else in the document (settings for
//! dashboard widgets that have no pipeline) is ignored here and left intact
//! by the storage layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Integration;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing {integration} settings")]
    MissingSection { integration: Integration },

    #[error("missing {integration} setting `{key}`")]
    MissingKey {
        integration: Integration,
        key: &'static str,
    },

    #[error("invalid settings document: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<TraktSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedly: Option<FeedlySettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goodreads: Option<GoodreadsSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSettings {
    pub last_fm_key: Option<String>,
    pub last_fm_username: Option<String>,
    pub spotify_id: Option<String>,
    pub spotify_secret: Option<String>,
    /// Re-host artist artwork on Cloudinary after each run.
    #[serde(default)]
    pub cloudinary_upload: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraktSettings {
    pub user: Option<String>,
    /// Trakt API client id, sent as `trakt-api-key`.
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedlySettings {
    /// OPML export of the subscribed feeds.
    pub opml: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodreadsSettings {
    pub user_id: Option<String>,
    /// RSS key for profiles that are not public.
    pub key: Option<String>,
    pub shelf: Option<String>,
}

impl Settings {
    /// Decode the stored JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] if a known section has the wrong shape.
    pub fn from_document(document: serde_json::Value) -> Result<Self, SettingsError> {
        Ok(serde_json::from_value(document)?)
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::MissingSection`] if there is no `music` section.
    pub fn music(&self) -> Result<&MusicSettings, SettingsError> {
        section(self.music.as_ref(), Integration::Music)
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::MissingSection`] if there is no `trakt` section.
    pub fn trakt(&self) -> Result<&TraktSettings, SettingsError> {
        section(self.trakt.as_ref(), Integration::Trakt)
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::MissingSection`] if there is no `feedly` section.
    pub fn feedly(&self) -> Result<&FeedlySettings, SettingsError> {
        section(self.feedly.as_ref(), Integration::Feedly)
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::MissingSection`] if there is no `goodreads` section.
    pub fn goodreads(&self) -> Result<&GoodreadsSettings, SettingsError> {
        section(self.goodreads.as_ref(), Integration::Goodreads)
    }
}

/// Return the trimmed value of a required setting.
///
/// Blank strings count as missing.
///
/// # Errors
///
/// Returns [`SettingsError::MissingKey`] naming the integration and key.
pub fn require<'a>(
    value: Option<&'a String>,
    integration: Integration,
    key: &'static str,
) -> Result<&'a str, SettingsError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(SettingsError::MissingKey { integration, key })
}

fn section<T>(value: Option<&T>, integration: Integration) -> Result<&T, SettingsError> {
    value.ok_or(SettingsError::MissingSection { integration })
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A third-party data source polled by a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integration {
    Music,
    Trakt,
    Feedly,
    Goodreads,
}

#[derive(Debug, Error)]
#[error("unknown integration: {0}")]
pub struct UnknownIntegration(pub String);

impl Integration {
    pub const ALL: [Integration; 4] = [
        Integration::Music,
        Integration::Trakt,
        Integration::Feedly,
        Integration::Goodreads,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Integration::Music => "music",
            Integration::Trakt => "trakt",
            Integration::Feedly => "feedly",
            Integration::Goodreads => "goodreads",
        }
    }

    /// Name of the table holding this integration's snapshots.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Integration::Music => "music_snapshots",
            Integration::Trakt => "trakt_snapshots",
            Integration::Feedly => "feedly_snapshots",
            Integration::Goodreads => "goodreads_snapshots",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Integration {
    type Err = UnknownIntegration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Integration::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownIntegration(s.to_string()))
    }
}

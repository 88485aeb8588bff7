use std::fmt;

use homedash_core::{SettingsError, StoreError};
use thiserror::Error;

/// Errors returned by the remote fetchers and the pipeline orchestrator.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// A required settings section or key is absent.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The settings document could not be loaded.
    #[error("could not load settings: {0}")]
    LoadSettings(#[source] StoreError),

    /// A configured base URL is not a valid absolute URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error calling {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered with a non-2xx status.
    #[error("{context} returned HTTP {status}")]
    UnexpectedStatus { context: &'static str, status: u16 },

    /// The remote service reported an application-level error in a 2xx body.
    #[error("{context} reported an error: {message}")]
    Api {
        context: &'static str,
        message: String,
    },

    /// The response body is not valid JSON for the expected schema.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The response body is not well-formed XML.
    #[error("XML parse error for {context}: {source}")]
    Xml {
        context: &'static str,
        #[source]
        source: quick_xml::Error,
    },

    /// The payload parsed but lacks a field the snapshot needs.
    #[error("could not parse {context}: {reason}")]
    Shape {
        context: &'static str,
        reason: String,
    },

    /// The finished snapshot could not be written.
    #[error("could not persist snapshot: {0}")]
    Persist(#[source] StoreError),
}

/// Coarse classification used when logging a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Remote,
    Shape,
    Persist,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Remote => "remote",
            ErrorKind::Shape => "shape",
            ErrorKind::Persist => "persist",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IntegrationError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            IntegrationError::Settings(_)
            | IntegrationError::LoadSettings(_)
            | IntegrationError::InvalidEndpoint { .. } => ErrorKind::Config,
            IntegrationError::Http { .. }
            | IntegrationError::UnexpectedStatus { .. }
            | IntegrationError::Api { .. }
            | IntegrationError::Deserialize { .. }
            | IntegrationError::Xml { .. } => ErrorKind::Remote,
            IntegrationError::Shape { .. } => ErrorKind::Shape,
            IntegrationError::Persist(_) => ErrorKind::Persist,
        }
    }

    pub(crate) fn shape(context: &'static str, reason: impl Into<String>) -> Self {
        IntegrationError::Shape {
            context,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use homedash_core::Integration;

    use super::*;

    #[test]
    fn missing_key_is_a_config_error() {
        let err = IntegrationError::from(SettingsError::MissingKey {
            integration: Integration::Music,
            key: "lastFmKey",
        });
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.to_string(), "missing music setting `lastFmKey`");
    }

    #[test]
    fn status_errors_are_remote() {
        let err = IntegrationError::UnexpectedStatus {
            context: "trakt user stats",
            status: 503,
        };
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.to_string(), "trakt user stats returned HTTP 503");
    }

    #[test]
    fn shape_and_persist_are_distinct_kinds() {
        assert_eq!(
            IntegrationError::shape("last.fm top artists", "no artists").kind(),
            ErrorKind::Shape
        );
        let persist = IntegrationError::Persist(StoreError::Backend("disk full".into()));
        assert_eq!(persist.kind(), ErrorKind::Persist);
        assert_eq!(persist.kind().to_string(), "persist");
    }
}

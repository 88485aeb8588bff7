//! Shared HTTP client for every third-party service the pipelines call.
//!
//! One [`ApiClient`] holds a single `reqwest::Client` plus the base URL of
//! each service. Production code uses [`Endpoints::default`]; tests point
//! every service at one mock server with [`Endpoints::single`].

use std::time::Duration;

use homedash_core::AppConfig;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::IntegrationError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "homedash/0.1 (personal-dashboard)";

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub lastfm: String,
    pub spotify_accounts: String,
    pub spotify_api: String,
    pub cloudinary: String,
    pub trakt: String,
    pub goodreads: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            lastfm: "https://ws.audioscrobbler.com".to_string(),
            spotify_accounts: "https://accounts.spotify.com".to_string(),
            spotify_api: "https://api.spotify.com".to_string(),
            cloudinary: "https://api.cloudinary.com".to_string(),
            trakt: "https://api.trakt.tv".to_string(),
            goodreads: "https://www.goodreads.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Every service served from the same base URL.
    #[must_use]
    pub fn single(base_url: &str) -> Self {
        Self {
            lastfm: base_url.to_string(),
            spotify_accounts: base_url.to_string(),
            spotify_api: base_url.to_string(),
            cloudinary: base_url.to_string(),
            trakt: base_url.to_string(),
            goodreads: base_url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Service {
    LastFm,
    SpotifyAccounts,
    SpotifyApi,
    Cloudinary,
    Trakt,
    Goodreads,
}

#[derive(Debug, Clone)]
struct BaseUrls {
    lastfm: Url,
    spotify_accounts: Url,
    spotify_api: Url,
    cloudinary: Url,
    trakt: Url,
    goodreads: Url,
}

/// HTTP client used by every fetcher. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    bases: BaseUrls,
}

impl ApiClient {
    /// Creates a client pointed at the production services.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, IntegrationError> {
        Self::with_endpoints(timeout_secs, user_agent, &Endpoints::default())
    }

    /// Creates a production client using the timeout and user agent from
    /// application config.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Http`] if the client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, IntegrationError> {
        Self::new(config.http_timeout_secs, &config.http_user_agent)
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`IntegrationError::InvalidEndpoint`] if a
    /// base URL does not parse.
    pub fn with_endpoints(
        timeout_secs: u64,
        user_agent: &str,
        endpoints: &Endpoints,
    ) -> Result<Self, IntegrationError> {
        let timeout_secs = if timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_secs
        };
        let user_agent = if user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT
        } else {
            user_agent
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|source| IntegrationError::Http {
                context: "client construction",
                source,
            })?;

        let bases = BaseUrls {
            lastfm: parse_base(&endpoints.lastfm)?,
            spotify_accounts: parse_base(&endpoints.spotify_accounts)?,
            spotify_api: parse_base(&endpoints.spotify_api)?,
            cloudinary: parse_base(&endpoints.cloudinary)?,
            trakt: parse_base(&endpoints.trakt)?,
            goodreads: parse_base(&endpoints.goodreads)?,
        };

        Ok(Self { client, bases })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Builds `<base>/<segments...>` for a service. Each segment is
    /// percent-encoded, so user-supplied names cannot escape the path.
    pub(crate) fn url(&self, service: Service, segments: &[&str]) -> Url {
        let mut url = match service {
            Service::LastFm => self.bases.lastfm.clone(),
            Service::SpotifyAccounts => self.bases.spotify_accounts.clone(),
            Service::SpotifyApi => self.bases.spotify_api.clone(),
            Service::Cloudinary => self.bases.cloudinary.clone(),
            Service::Trakt => self.bases.trakt.clone(),
            Service::Goodreads => self.bases.goodreads.clone(),
        };
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends the request, asserts a 2xx status, and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// - [`IntegrationError::Http`] on network failure.
    /// - [`IntegrationError::UnexpectedStatus`] on a non-2xx status.
    /// - [`IntegrationError::Deserialize`] if the body does not match `T`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &'static str,
    ) -> Result<T, IntegrationError> {
        let body = self.send_text(request, context).await?;
        serde_json::from_str(&body).map_err(|source| IntegrationError::Deserialize { context, source })
    }

    /// Sends the request, asserts a 2xx status, and returns the raw body.
    ///
    /// # Errors
    ///
    /// - [`IntegrationError::Http`] on network failure.
    /// - [`IntegrationError::UnexpectedStatus`] on a non-2xx status.
    pub(crate) async fn send_text(
        &self,
        request: RequestBuilder,
        context: &'static str,
    ) -> Result<String, IntegrationError> {
        let response = request
            .send()
            .await
            .map_err(|source| IntegrationError::Http { context, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntegrationError::UnexpectedStatus {
                context,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| IntegrationError::Http { context, source })
    }
}

fn parse_base(raw: &str) -> Result<Url, IntegrationError> {
    // Normalise so that path segments are appended after the base path
    // rather than replacing its last segment.
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| IntegrationError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(IntegrationError::InvalidEndpoint {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

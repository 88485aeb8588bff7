//! Spotify artist lookup, used to attach genres and artwork to the Last.fm
//! chart.

use serde::Deserialize;

use crate::client::{ApiClient, Service};
use crate::error::IntegrationError;
use crate::transform::best_fit_image;

/// Preferred artwork width in pixels.
pub const IMAGE_WIDTH: u32 = 320;

const TOKEN: &str = "spotify token";
const SEARCH: &str = "spotify artist search";

/// Client-credentials pair for the Spotify Web API.
#[derive(Debug, Clone, Copy)]
pub struct SpotifyCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Genres and best-fit artwork for one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistProfile {
    pub img: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    artists: Option<ArtistPage>,
}

#[derive(Debug, Deserialize)]
struct ArtistPage {
    #[serde(default)]
    items: Vec<SpotifyArtist>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    genres: Option<Vec<String>>,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
    width: Option<u32>,
}

/// Exchange client credentials for a bearer token.
///
/// # Errors
///
/// Returns a remote error if the token request fails or a shape error if the
/// response carries no token.
pub async fn access_token(
    client: &ApiClient,
    credentials: SpotifyCredentials<'_>,
) -> Result<String, IntegrationError> {
    let request = client
        .http()
        .post(client.url(Service::SpotifyAccounts, &["api", "token"]))
        .basic_auth(credentials.client_id, Some(credentials.client_secret))
        .form(&[("grant_type", "client_credentials")]);

    let response: TokenResponse = client.send_json(request, TOKEN).await?;
    parse_token(response)
}

/// Look up the best match for `artist` and return its genres and artwork.
///
/// # Errors
///
/// Returns a remote error if the search fails and a shape error if no artist,
/// genres, or image come back.
pub async fn artist_profile(
    client: &ApiClient,
    token: &str,
    artist: &str,
) -> Result<ArtistProfile, IntegrationError> {
    let request = client
        .http()
        .get(client.url(Service::SpotifyApi, &["v1", "search"]))
        .bearer_auth(token)
        .query(&[
            ("q", artist),
            ("type", "artist"),
            ("market", "US"),
            ("limit", "1"),
            ("offset", "0"),
        ]);

    let response: SearchResponse = client.send_json(request, SEARCH).await?;
    parse_artist_profile(response)
}

pub(crate) fn parse_token(response: TokenResponse) -> Result<String, IntegrationError> {
    match response.access_token.filter(|t| !t.is_empty()) {
        Some(token) => Ok(token),
        None => Err(IntegrationError::shape(
            TOKEN,
            format!(
                "no access token ({})",
                response.error.as_deref().unwrap_or("no error given")
            ),
        )),
    }
}

pub(crate) fn parse_artist_profile(response: SearchResponse) -> Result<ArtistProfile, IntegrationError> {
    let artist = response
        .artists
        .and_then(|page| page.items.into_iter().next())
        .ok_or_else(|| IntegrationError::shape(SEARCH, "no matching artist"))?;
    let genres = artist
        .genres
        .ok_or_else(|| IntegrationError::shape(SEARCH, "artist has no genres"))?;
    let img = best_fit_image(&artist.images, IMAGE_WIDTH, |i| i.width)
        .map(|i| i.url.clone())
        .ok_or_else(|| IntegrationError::shape(SEARCH, "artist has no images"))?;

    Ok(ArtistProfile { img, genres })
}

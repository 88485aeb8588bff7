//! Music pipeline: Last.fm chart and scrobble count, enriched with Spotify
//! genres and artwork, optionally re-hosted on Cloudinary.

use chrono::{DateTime, Months, TimeDelta, Utc};
use futures::future::try_join_all;
use homedash_core::settings::require;
use homedash_core::{CloudinaryCredentials, Integration, MusicSnapshot, Settings, TopArtist};

use crate::client::ApiClient;
use crate::cloudinary;
use crate::error::IntegrationError;
use crate::lastfm::{self, LastFmAccount};
use crate::pipeline::Clients;
use crate::spotify::{self, SpotifyCredentials};

/// Every credential the music pipeline needs, validated before any request
/// is made.
#[derive(Debug, Clone, Copy)]
pub struct MusicAccount<'a> {
    pub lastfm: LastFmAccount<'a>,
    pub spotify: SpotifyCredentials<'a>,
    pub cloudinary_upload: bool,
}

impl<'a> MusicAccount<'a> {
    /// # Errors
    ///
    /// Returns a config error naming the first missing key.
    pub fn from_settings(settings: &'a Settings) -> Result<Self, IntegrationError> {
        let section = settings.music()?;
        let music = Integration::Music;
        Ok(Self {
            lastfm: LastFmAccount {
                api_key: require(section.last_fm_key.as_ref(), music, "lastFmKey")?,
                username: require(section.last_fm_username.as_ref(), music, "lastFmUsername")?,
            },
            spotify: SpotifyCredentials {
                client_id: require(section.spotify_id.as_ref(), music, "spotifyId")?,
                client_secret: require(section.spotify_secret.as_ref(), music, "spotifySecret")?,
            },
            cloudinary_upload: section.cloudinary_upload,
        })
    }
}

/// Chart fetched; no scrobble count yet.
#[derive(Debug)]
struct ChartStage {
    artist_count: u64,
    names: Vec<String>,
}

#[derive(Debug)]
struct CountedStage {
    chart: ChartStage,
    song_count: u64,
}

/// The one-year window ending at `to`.
fn past_year(to: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = to
        .checked_sub_months(Months::new(12))
        .unwrap_or(to - TimeDelta::days(365));
    (from, to)
}

/// Run the music stages in order. Artist lookups run concurrently; the first
/// failed lookup fails the run.
///
/// # Errors
///
/// Returns the first stage failure. Cloudinary failures are logged and the
/// Spotify image is kept.
pub async fn collect(clients: &Clients, settings: &Settings) -> Result<MusicSnapshot, IntegrationError> {
    let account = MusicAccount::from_settings(settings)?;
    let api = &clients.api;

    let chart = lastfm::top_artists(api, account.lastfm).await?;
    let stage = ChartStage {
        artist_count: chart.artist_count,
        names: chart.names,
    };

    let (from, to) = past_year(Utc::now());
    let stage = CountedStage {
        song_count: lastfm::scrobble_count(api, account.lastfm, from, to).await?,
        chart: stage,
    };

    let token = spotify::access_token(api, account.spotify).await?;
    let uploads = if account.cloudinary_upload {
        if clients.cloudinary.is_none() {
            tracing::warn!(
                "music: cloudinaryUpload is enabled but CLOUDINARY_* credentials are not set; keeping Spotify images"
            );
        }
        clients.cloudinary.as_ref()
    } else {
        None
    };

    let top_artists = try_join_all(
        stage
            .chart
            .names
            .iter()
            .map(|name| enrich_artist(api, &token, uploads, name)),
    )
    .await?;

    Ok(MusicSnapshot {
        artist_count: stage.chart.artist_count,
        song_count: stage.song_count,
        top_artists,
    })
}

async fn enrich_artist(
    api: &ApiClient,
    token: &str,
    uploads: Option<&CloudinaryCredentials>,
    name: &str,
) -> Result<TopArtist, IntegrationError> {
    let profile = spotify::artist_profile(api, token, name).await?;

    let img = match uploads {
        Some(credentials) => {
            match cloudinary::upload_artist_image(api, credentials, name, &profile.img).await {
                Ok(hosted) => hosted,
                Err(e) => {
                    tracing::error!(artist = %name, error = %e, "music: cloudinary upload failed");
                    profile.img
                }
            }
        }
        None => profile.img,
    };

    Ok(TopArtist {
        artist: name.to_string(),
        img,
        genres: profile.genres,
    })
}

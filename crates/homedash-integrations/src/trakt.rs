//! Trakt watch statistics and the user's highest-rated movies and shows.

use chrono::{DateTime, Utc};
use homedash_core::settings::require;
use homedash_core::{
    Integration, RatedTitle, Settings, TraktEpisodeStats, TraktMovieStats, TraktRatingStats,
    TraktShowStats, TraktSnapshot, TraktStats,
};
use serde::Deserialize;

use crate::client::{ApiClient, Service};
use crate::error::IntegrationError;
use crate::transform::filter_by_rating;

/// Lowest rating that counts as a favourite.
pub const MIN_RATING: u8 = 9;

const API_VERSION: &str = "2";
const STATS: &str = "trakt user stats";
const RATINGS: &str = "trakt ratings";

/// Which rating list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movies,
    Shows,
}

impl MediaType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movies => "movies",
            MediaType::Shows => "shows",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TraktAccount<'a> {
    pub user: &'a str,
    /// API client id, sent as `trakt-api-key`.
    pub client_id: &'a str,
}

impl<'a> TraktAccount<'a> {
    /// # Errors
    ///
    /// Returns a config error if the `trakt` section, `user`, or `id` is missing.
    pub fn from_settings(settings: &'a Settings) -> Result<Self, IntegrationError> {
        let section = settings.trakt()?;
        Ok(Self {
            user: require(section.user.as_ref(), Integration::Trakt, "user")?,
            client_id: require(section.id.as_ref(), Integration::Trakt, "id")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    movies: Option<TraktMovieStats>,
    shows: Option<TraktShowStats>,
    episodes: Option<TraktEpisodeStats>,
    ratings: Option<TraktRatingStats>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatingItem {
    rating: Option<u8>,
    rated_at: Option<DateTime<Utc>>,
    movie: Option<Media>,
    show: Option<Media>,
}

#[derive(Debug, Deserialize)]
struct Media {
    title: Option<String>,
    year: Option<i32>,
    #[serde(default)]
    ids: MediaIds,
}

#[derive(Debug, Default, Deserialize)]
struct MediaIds {
    slug: Option<String>,
    imdb: Option<String>,
    tmdb: Option<i64>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn get(client: &ApiClient, account: TraktAccount<'_>, segments: &[&str]) -> reqwest::RequestBuilder {
    client
        .http()
        .get(client.url(Service::Trakt, segments))
        .header("Content-Type", "application/json")
        .header("trakt-api-version", API_VERSION)
        .header("trakt-api-key", account.client_id)
}

/// Fetch the account's lifetime watch statistics.
///
/// # Errors
///
/// Returns a remote error if the request fails and a shape error if a
/// statistics section is absent.
pub async fn user_stats(
    client: &ApiClient,
    account: TraktAccount<'_>,
) -> Result<TraktStats, IntegrationError> {
    let request = get(client, account, &["users", account.user, "stats"]);
    let response: StatsResponse = client.send_json(request, STATS).await?;
    parse_stats(response)
}

/// Fetch the titles the user rated 9 or 10, in the order Trakt returns them.
///
/// # Errors
///
/// Returns a remote error if the request fails and a shape error if an entry
/// has no title.
pub async fn top_rated(
    client: &ApiClient,
    account: TraktAccount<'_>,
    media: MediaType,
) -> Result<Vec<RatedTitle>, IntegrationError> {
    let request = get(
        client,
        account,
        &["users", account.user, "ratings", media.as_str(), "9,10"],
    );
    let items: Vec<RatingItem> = client.send_json(request, RATINGS).await?;
    parse_ratings(items, media)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub(crate) fn parse_stats(response: StatsResponse) -> Result<TraktStats, IntegrationError> {
    let missing = |section: &str| IntegrationError::shape(STATS, format!("missing `{section}`"));
    Ok(TraktStats {
        movies: response.movies.ok_or_else(|| missing("movies"))?,
        shows: response.shows.ok_or_else(|| missing("shows"))?,
        episodes: response.episodes.ok_or_else(|| missing("episodes"))?,
        ratings: response.ratings.ok_or_else(|| missing("ratings"))?,
    })
}

pub(crate) fn parse_ratings(
    items: Vec<RatingItem>,
    media: MediaType,
) -> Result<Vec<RatedTitle>, IntegrationError> {
    filter_by_rating(items, MIN_RATING, |item| item.rating)
        .into_iter()
        .map(|item| {
            let rating = item.rating.unwrap_or(MIN_RATING);
            let entry = match media {
                MediaType::Movies => item.movie,
                MediaType::Shows => item.show,
            }
            .ok_or_else(|| IntegrationError::shape(RATINGS, format!("entry without `{}`", media.as_str())))?;
            let title = entry
                .title
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| IntegrationError::shape(RATINGS, "entry without a title"))?;

            Ok(RatedTitle {
                title,
                year: entry.year,
                rating,
                rated_at: item.rated_at,
                slug: entry.ids.slug,
                imdb: entry.ids.imdb,
                tmdb: entry.ids.tmdb,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Statistics fetched; ratings not yet requested.
#[derive(Debug)]
struct WithStats {
    stats: TraktStats,
}

#[derive(Debug)]
struct WithMovies {
    stats: TraktStats,
    top_movies: Vec<RatedTitle>,
}

/// Run the Trakt stages: statistics, then top movies, then top shows.
///
/// # Errors
///
/// Returns the first stage failure.
pub async fn collect(client: &ApiClient, settings: &Settings) -> Result<TraktSnapshot, IntegrationError> {
    let account = TraktAccount::from_settings(settings)?;

    let stage = WithStats {
        stats: user_stats(client, account).await?,
    };
    let stage = WithMovies {
        top_movies: top_rated(client, account, MediaType::Movies).await?,
        stats: stage.stats,
    };
    let top_shows = top_rated(client, account, MediaType::Shows).await?;

    Ok(TraktSnapshot {
        stats: stage.stats,
        top_movies: stage.top_movies,
        top_shows,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn items(value: serde_json::Value) -> Vec<RatingItem> {
        serde_json::from_value(value).expect("wire shape")
    }

    #[test]
    fn ratings_below_nine_are_dropped_in_order() {
        let parsed = parse_ratings(
            items(json!([
                { "rating": 5, "movie": { "title": "A" } },
                { "rating": 9, "movie": { "title": "B" } },
                { "rating": 10, "movie": { "title": "C", "year": 1999 } },
                { "rating": 9, "movie": { "title": "D" } }
            ])),
            MediaType::Movies,
        )
        .expect("ratings");

        let titles: Vec<_> = parsed.iter().map(|t| (t.title.as_str(), t.rating)).collect();
        assert_eq!(titles, vec![("B", 9), ("C", 10), ("D", 9)]);
        assert_eq!(parsed[1].year, Some(1999));
    }

    #[test]
    fn show_ratings_read_the_show_object() {
        let parsed = parse_ratings(
            items(json!([{
                "rating": 10,
                "rated_at": "2024-03-01T20:15:00.000Z",
                "type": "show",
                "show": { "title": "The Wire", "year": 2002,
                          "ids": { "trakt": 1, "slug": "the-wire", "imdb": "tt0306414", "tmdb": 1438 } }
            }])),
            MediaType::Shows,
        )
        .expect("ratings");

        assert_eq!(parsed[0].slug.as_deref(), Some("the-wire"));
        assert_eq!(parsed[0].tmdb, Some(1438));
        assert!(parsed[0].rated_at.is_some());
    }

    #[test]
    fn entry_without_media_is_a_shape_error() {
        let err = parse_ratings(items(json!([{ "rating": 10 }])), MediaType::Movies)
            .expect_err("no movie");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn stats_require_every_section() {
        let response: StatsResponse = serde_json::from_value(json!({
            "movies": { "plays": 1, "watched": 1, "minutes": 90, "collected": 0, "ratings": 1, "comments": 0 }
        }))
        .expect("wire shape");
        let err = parse_stats(response).expect_err("missing sections");
        assert!(err.to_string().contains("shows"), "{err}");
    }

    #[test]
    fn account_requires_user_and_id() {
        let settings = Settings::from_document(json!({ "trakt": { "user": "jane" } })).expect("settings");
        let err = TraktAccount::from_settings(&settings).expect_err("no id");
        assert_eq!(err.to_string(), "missing trakt setting `id`");
    }
}

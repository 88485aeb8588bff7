//! Normalized records written by the integration pipelines.
//!
//! Each snapshot is a point-in-time summary of one third-party account. Field
//! names serialize in `camelCase` because the stored documents are read
//! directly by the dashboard front end.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Integration;

// ---------------------------------------------------------------------------
// Music
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSnapshot {
    /// Distinct artists scrobbled in the last 12 months.
    pub artist_count: u64,
    /// Tracks scrobbled in the last 12 months.
    pub song_count: u64,
    pub top_artists: Vec<TopArtist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopArtist {
    pub artist: String,
    pub img: String,
    pub genres: Vec<String>,
}

// ---------------------------------------------------------------------------
// Trakt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraktSnapshot {
    pub stats: TraktStats,
    pub top_movies: Vec<RatedTitle>,
    pub top_shows: Vec<RatedTitle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraktStats {
    pub movies: TraktMovieStats,
    pub shows: TraktShowStats,
    pub episodes: TraktEpisodeStats,
    pub ratings: TraktRatingStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraktMovieStats {
    pub plays: u64,
    pub watched: u64,
    pub minutes: u64,
    pub collected: u64,
    pub ratings: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraktShowStats {
    pub watched: u64,
    pub collected: u64,
    pub ratings: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraktEpisodeStats {
    pub plays: u64,
    pub watched: u64,
    pub minutes: u64,
    pub collected: u64,
    pub ratings: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraktRatingStats {
    pub total: u64,
    /// Count of ratings per score, keyed `"1"` through `"10"`.
    pub distribution: BTreeMap<String, u64>,
}

/// A movie or show the user rated highly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedTitle {
    pub title: String,
    pub year: Option<i32>,
    pub rating: u8,
    pub rated_at: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    pub imdb: Option<String>,
    pub tmdb: Option<i64>,
}

// ---------------------------------------------------------------------------
// Feedly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedlySnapshot {
    pub feeds: Vec<FeedOutline>,
}

/// One `<outline>` from an OPML subscription list. Categories carry their
/// feeds in `children`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOutline {
    pub title: Option<String>,
    pub text: Option<String>,
    pub xml_url: Option<String>,
    pub html_url: Option<String>,
    /// The outline's `type` attribute, usually `"rss"` for feeds.
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FeedOutline>,
}

// ---------------------------------------------------------------------------
// Goodreads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodreadsSnapshot {
    pub book_count: u64,
    pub page_count: u64,
    pub top_books: Vec<Book>,
    pub recent_books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: Option<String>,
    /// The user's own star rating; `0` means unrated.
    pub rating: u8,
    pub read_at: Option<DateTime<Utc>>,
    pub img: Option<String>,
    pub pages: Option<u32>,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A finished snapshot for any integration, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Music(MusicSnapshot),
    Trakt(TraktSnapshot),
    Feedly(FeedlySnapshot),
    Goodreads(GoodreadsSnapshot),
}

impl Snapshot {
    #[must_use]
    pub fn integration(&self) -> Integration {
        match self {
            Snapshot::Music(_) => Integration::Music,
            Snapshot::Trakt(_) => Integration::Trakt,
            Snapshot::Feedly(_) => Integration::Feedly,
            Snapshot::Goodreads(_) => Integration::Goodreads,
        }
    }

    /// Serialize the inner record into the JSON document that gets stored,
    /// tagged with its owner as `userId` (`null` for the global document).
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if serialization fails.
    pub fn to_document(&self, user_id: Option<i64>) -> Result<serde_json::Value, serde_json::Error> {
        let mut document = match self {
            Snapshot::Music(s) => serde_json::to_value(s),
            Snapshot::Trakt(s) => serde_json::to_value(s),
            Snapshot::Feedly(s) => serde_json::to_value(s),
            Snapshot::Goodreads(s) => serde_json::to_value(s),
        }?;
        if let serde_json::Value::Object(fields) = &mut document {
            fields.insert("userId".to_string(), serde_json::json!(user_id));
        }
        Ok(document)
    }
}

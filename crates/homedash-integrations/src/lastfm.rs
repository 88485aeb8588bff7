//! Last.fm listening statistics.
//!
//! Only two `user.*` methods are used: the ranked artist chart for the past
//! 12 months and the scrobble total over the same window. Artist images are
//! taken from Spotify instead; Last.fm's are unreliable.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::client::{ApiClient, Service};
use crate::error::IntegrationError;
use crate::transform::top_n;

pub const TOP_ARTIST_LIMIT: usize = 15;

const TOP_ARTISTS: &str = "last.fm top artists";
const RECENT_TRACKS: &str = "last.fm recent tracks";

/// Credentials for the Last.fm read API.
#[derive(Debug, Clone, Copy)]
pub struct LastFmAccount<'a> {
    pub username: &'a str,
    pub api_key: &'a str,
}

/// The ranked artist chart with the total number of distinct artists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopArtists {
    pub artist_count: u64,
    pub names: Vec<String>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Last.fm reports totals as strings, but some proxies re-encode them as
/// numbers. Accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    fn parse(&self, context: &'static str) -> Result<u64, IntegrationError> {
        match self {
            Count::Number(n) => Ok(*n),
            Count::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| IntegrationError::shape(context, format!("total {s:?} is not a count"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageAttr {
    total: Option<Count>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopArtistsResponse {
    topartists: Option<TopArtistsBody>,
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopArtistsBody {
    #[serde(default)]
    artist: Vec<ArtistEntry>,
    #[serde(rename = "@attr")]
    attr: Option<PageAttr>,
}

#[derive(Debug, Deserialize)]
struct ArtistEntry {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecentTracksResponse {
    recenttracks: Option<RecentTracksBody>,
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentTracksBody {
    #[serde(rename = "@attr")]
    attr: Option<PageAttr>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Fetch the top artists of the past 12 months.
///
/// # Errors
///
/// Returns a remote error if the request fails and a shape error if the
/// chart is empty or missing its total.
pub async fn top_artists(
    client: &ApiClient,
    account: LastFmAccount<'_>,
) -> Result<TopArtists, IntegrationError> {
    let limit = TOP_ARTIST_LIMIT.to_string();
    let request = client
        .http()
        .get(client.url(Service::LastFm, &["2.0", ""]))
        .query(&[
            ("method", "user.gettopartists"),
            ("user", account.username),
            ("limit", limit.as_str()),
            ("page", "1"),
            ("period", "12month"),
            ("api_key", account.api_key),
            ("format", "json"),
        ]);

    let response: TopArtistsResponse = client.send_json(request, TOP_ARTISTS).await?;
    parse_top_artists(response)
}

/// Count scrobbles between `from` and `to`.
///
/// Asks for a single track per page; only the page total is read.
///
/// # Errors
///
/// Returns a remote error if the request fails and a shape error if the
/// response has no total.
pub async fn scrobble_count(
    client: &ApiClient,
    account: LastFmAccount<'_>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<u64, IntegrationError> {
    let from = from.timestamp().to_string();
    let to = to.timestamp().to_string();
    let request = client
        .http()
        .get(client.url(Service::LastFm, &["2.0", ""]))
        .query(&[
            ("method", "user.getrecenttracks"),
            ("user", account.username),
            ("limit", "1"),
            ("page", "1"),
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("api_key", account.api_key),
            ("format", "json"),
        ]);

    let response: RecentTracksResponse = client.send_json(request, RECENT_TRACKS).await?;
    parse_scrobble_count(response)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub(crate) fn parse_top_artists(response: TopArtistsResponse) -> Result<TopArtists, IntegrationError> {
    check_api_error(TOP_ARTISTS, response.error, response.message)?;

    let body = response
        .topartists
        .ok_or_else(|| IntegrationError::shape(TOP_ARTISTS, "missing `topartists`"))?;
    let total = body
        .attr
        .and_then(|a| a.total)
        .ok_or_else(|| IntegrationError::shape(TOP_ARTISTS, "missing `@attr.total`"))?;
    let artist_count = total.parse(TOP_ARTISTS)?;

    let names = body
        .artist
        .into_iter()
        .map(|a| a.name.filter(|n| !n.trim().is_empty()))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| IntegrationError::shape(TOP_ARTISTS, "artist without a name"))?;
    if names.is_empty() {
        return Err(IntegrationError::shape(TOP_ARTISTS, "no artists in chart"));
    }

    Ok(TopArtists {
        artist_count,
        names: top_n(names, TOP_ARTIST_LIMIT),
    })
}

pub(crate) fn parse_scrobble_count(response: RecentTracksResponse) -> Result<u64, IntegrationError> {
    check_api_error(RECENT_TRACKS, response.error, response.message)?;

    response
        .recenttracks
        .and_then(|b| b.attr)
        .and_then(|a| a.total)
        .ok_or_else(|| IntegrationError::shape(RECENT_TRACKS, "missing `recenttracks.@attr.total`"))?
        .parse(RECENT_TRACKS)
}

/// Last.fm sometimes reports failures in a 200 body as `{error, message}`.
fn check_api_error(
    context: &'static str,
    code: Option<i64>,
    message: Option<String>,
) -> Result<(), IntegrationError> {
    match code {
        Some(code) => Err(IntegrationError::Api {
            context,
            message: format!(
                "{} (code {code})",
                message.as_deref().unwrap_or("unknown error")
            ),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn top(value: serde_json::Value) -> Result<TopArtists, IntegrationError> {
        parse_top_artists(serde_json::from_value(value).expect("wire shape"))
    }

    #[test]
    fn total_accepts_string_or_number() {
        let text = top(json!({
            "topartists": { "artist": [{ "name": "Low" }], "@attr": { "total": "412" } }
        }))
        .expect("string total");
        assert_eq!(text.artist_count, 412);

        let number = top(json!({
            "topartists": { "artist": [{ "name": "Low" }], "@attr": { "total": 412 } }
        }))
        .expect("numeric total");
        assert_eq!(number.artist_count, 412);
    }

    #[test]
    fn chart_is_capped_at_fifteen_in_rank_order() {
        let artists: Vec<_> = (1..=20).map(|i| json!({ "name": format!("artist {i}") })).collect();
        let chart = top(json!({
            "topartists": { "artist": artists, "@attr": { "total": "20" } }
        }))
        .expect("chart");

        assert_eq!(chart.names.len(), 15);
        assert_eq!(chart.names[0], "artist 1");
        assert_eq!(chart.names[14], "artist 15");
    }

    #[test]
    fn empty_chart_is_a_shape_error() {
        let err = top(json!({
            "topartists": { "artist": [], "@attr": { "total": "0" } }
        }))
        .expect_err("empty chart");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn missing_attr_is_a_shape_error() {
        let err = top(json!({ "topartists": { "artist": [{ "name": "Low" }] } }))
            .expect_err("no @attr");
        assert!(err.to_string().contains("@attr.total"), "{err}");
    }

    #[test]
    fn non_numeric_total_is_a_shape_error() {
        let err = top(json!({
            "topartists": { "artist": [{ "name": "Low" }], "@attr": { "total": "lots" } }
        }))
        .expect_err("bad total");
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn error_body_is_reported_as_api_error() {
        let err = top(json!({ "error": 10, "message": "Invalid API key" })).expect_err("api error");
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().contains("Invalid API key"), "{err}");
    }

    #[test]
    fn scrobble_total_is_read_from_attr() {
        let response = serde_json::from_value(json!({
            "recenttracks": { "track": [], "@attr": { "total": "9120", "page": "1" } }
        }))
        .expect("wire shape");
        assert_eq!(parse_scrobble_count(response).expect("count"), 9120);
    }
}

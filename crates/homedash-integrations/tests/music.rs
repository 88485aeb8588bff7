//! Music pipeline against wiremock stand-ins for Last.fm, Spotify, and
//! Cloudinary.

mod common;

use common::{clients, MemoryStore};
use homedash_core::{CloudinaryCredentials, Integration, Snapshot};
use homedash_integrations::{run_pipeline, ErrorKind, IntegrationError};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn music_settings(upload: bool) -> serde_json::Value {
    json!({
        "music": {
            "lastFmKey": "lf-key",
            "lastFmUsername": "jane",
            "spotifyId": "sp-id",
            "spotifySecret": "sp-secret",
            "cloudinaryUpload": upload
        }
    })
}

fn search_body(genre: &str, image: &str) -> serde_json::Value {
    json!({
        "artists": { "items": [{
            "genres": [genre],
            "images": [
                { "url": format!("{image}/640"), "width": 640, "height": 640 },
                { "url": format!("{image}/320"), "width": 320, "height": 320 },
                { "url": format!("{image}/160"), "width": 160, "height": 160 }
            ]
        }]}
    })
}

async fn mount_lastfm(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("method", "user.gettopartists"))
        .and(query_param("user", "jane"))
        .and(query_param("api_key", "lf-key"))
        .and(query_param("limit", "15"))
        .and(query_param("period", "12month"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "topartists": {
                "artist": [{ "name": "Low" }, { "name": "Khruangbin" }],
                "@attr": { "user": "jane", "total": "412" }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("method", "user.getrecenttracks"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recenttracks": { "track": [], "@attr": { "total": 9120 } }
        })))
        .mount(server)
        .await;
}

async fn mount_spotify(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok", "token_type": "Bearer", "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "Low"))
        .and(query_param("type", "artist"))
        .and(query_param("market", "US"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body("slowcore", "https://i/low")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "Khruangbin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_body("psychedelic soul", "https://i/kb")),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn successful_run_writes_one_music_snapshot() {
    let server = MockServer::start().await;
    mount_lastfm(&server).await;
    mount_spotify(&server).await;

    let store = MemoryStore::with_settings(music_settings(false));
    let id = run_pipeline(&store, &clients(&server.uri()), Integration::Music, Some(7))
        .await
        .expect("music run should succeed");

    let rows = store.snapshots();
    assert_eq!(id, 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, Some(7));

    let Snapshot::Music(music) = &rows[0].1 else {
        panic!("expected a music snapshot, got {:?}", rows[0].1);
    };
    assert_eq!(music.artist_count, 412);
    assert_eq!(music.song_count, 9120);
    assert_eq!(music.top_artists.len(), 2);
    assert_eq!(music.top_artists[0].artist, "Low");
    assert_eq!(music.top_artists[0].img, "https://i/low/320");
    assert_eq!(music.top_artists[0].genres, vec!["slowcore".to_string()]);
    assert_eq!(music.top_artists[1].artist, "Khruangbin");
}

#[tokio::test]
async fn missing_lastfm_key_makes_no_requests_and_writes_nothing() {
    let server = MockServer::start().await;
    let store = MemoryStore::with_settings(json!({
        "music": { "lastFmUsername": "jane", "spotifyId": "i", "spotifySecret": "s" }
    }));

    let err = run_pipeline(&store, &clients(&server.uri()), Integration::Music, None)
        .await
        .expect_err("missing key should fail");

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.to_string(), "missing music setting `lastFmKey`");
    assert!(store.snapshots().is_empty());
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no HTTP calls expected, got {}", requests.len());
}

#[tokio::test]
async fn one_failed_artist_lookup_fails_the_run_without_writing() {
    let server = MockServer::start().await;
    mount_lastfm(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "Low"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body("slowcore", "https://i/low")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "Khruangbin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "artists": { "items": [] } })))
        .mount(&server)
        .await;

    let store = MemoryStore::with_settings(music_settings(false));
    let err = run_pipeline(&store, &clients(&server.uri()), Integration::Music, None)
        .await
        .expect_err("enrichment failure should fail the run");

    assert_eq!(err.kind(), ErrorKind::Shape);
    assert!(store.snapshots().is_empty());
}

#[tokio::test]
async fn lastfm_server_error_is_remote_and_stops_the_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = MemoryStore::with_settings(music_settings(false));
    let err = run_pipeline(&store, &clients(&server.uri()), Integration::Music, None)
        .await
        .expect_err("503 should fail");

    assert!(matches!(
        err,
        IntegrationError::UnexpectedStatus { status: 503, .. }
    ));
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1, "later stages must not run");
    assert!(store.snapshots().is_empty());
}

#[tokio::test]
async fn cloudinary_upload_replaces_image_and_failures_keep_spotify_image() {
    let server = MockServer::start().await;
    mount_lastfm(&server).await;
    mount_spotify(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .and(body_string_contains("public_id=low-artist"))
        .and(body_string_contains("signature_algorithm=sha256"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://res.cloudinary.com/demo/image/upload/music/low-artist.jpg"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1_1/demo/image/upload"))
        .and(body_string_contains("public_id=khruangbin-artist"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut clients = clients(&server.uri());
    clients.cloudinary = Some(CloudinaryCredentials {
        cloud_name: "demo".to_string(),
        api_key: "ck".to_string(),
        api_secret: "cs".to_string(),
    });

    let store = MemoryStore::with_settings(music_settings(true));
    run_pipeline(&store, &clients, Integration::Music, None)
        .await
        .expect("upload failures are not fatal");

    let Snapshot::Music(music) = &store.snapshots()[0].1 else {
        panic!("expected a music snapshot");
    };
    assert_eq!(
        music.top_artists[0].img,
        "https://res.cloudinary.com/demo/image/upload/music/low-artist.jpg"
    );
    assert_eq!(music.top_artists[1].img, "https://i/kb/320");
}

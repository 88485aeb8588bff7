use super::*;

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::with_endpoints(30, "homedash-test", &Endpoints::single(base_url))
        .expect("client construction should not fail")
}

#[test]
fn url_appends_segments_to_base() {
    let client = test_client("https://api.trakt.tv");
    let url = client.url(Service::Trakt, &["users", "jane", "stats"]);
    assert_eq!(url.as_str(), "https://api.trakt.tv/users/jane/stats");
}

#[test]
fn url_keeps_base_path_and_strips_trailing_slash() {
    let client = test_client("http://127.0.0.1:9000/mock/");
    let url = client.url(Service::LastFm, &["2.0", ""]);
    assert_eq!(url.as_str(), "http://127.0.0.1:9000/mock/2.0/");
}

#[test]
fn url_encodes_user_supplied_segments() {
    let client = test_client("https://api.trakt.tv");
    let url = client.url(Service::Trakt, &["users", "../admin?x=1", "stats"]);
    assert!(
        url.as_str().starts_with("https://api.trakt.tv/users/")
            && url.as_str().ends_with("/stats")
            && !url.as_str().contains('?'),
        "segment should be percent-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ApiClient::with_endpoints(30, "ua", &Endpoints::single("not a url"))
        .expect_err("should reject");
    assert!(matches!(err, IntegrationError::InvalidEndpoint { .. }));
}

#[test]
fn default_endpoints_use_https() {
    let endpoints = Endpoints::default();
    for base in [
        &endpoints.lastfm,
        &endpoints.spotify_accounts,
        &endpoints.spotify_api,
        &endpoints.cloudinary,
        &endpoints.trakt,
        &endpoints.goodreads,
    ] {
        assert!(base.starts_with("https://"), "{base}");
    }
}

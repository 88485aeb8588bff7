//! Goodreads shelf feed against a wiremock server.

mod common;

use common::{clients, MemoryStore};
use homedash_core::{Integration, Snapshot};
use homedash_integrations::{run_pipeline, ErrorKind};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHELF_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Jane's bookshelf: favorites</title>
    <item>
      <title><![CDATA[Piranesi]]></title>
      <author_name>Susanna Clarke</author_name>
      <user_rating>5</user_rating>
      <book id="1"><num_pages>272</num_pages></book>
    </item>
    <item>
      <title>Middlemarch</title>
      <author_name>George Eliot</author_name>
      <user_rating>3</user_rating>
      <book id="2"><num_pages>880</num_pages></book>
    </item>
  </channel>
</rss>"#;

#[tokio::test]
async fn fetches_configured_shelf_with_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/review/list_rss/42"))
        .and(query_param("shelf", "favorites"))
        .and(query_param("key", "rss-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(SHELF_RSS),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::with_settings(json!({
        "goodreads": { "userId": "42", "key": "rss-key", "shelf": "favorites" }
    }));
    run_pipeline(&store, &clients(&server.uri()), Integration::Goodreads, None)
        .await
        .expect("goodreads run should succeed");

    let rows = store.snapshots();
    let Snapshot::Goodreads(snapshot) = &rows[0].1 else {
        panic!("expected a goodreads snapshot");
    };
    assert_eq!(snapshot.book_count, 2);
    assert_eq!(snapshot.page_count, 1152);
    assert_eq!(snapshot.top_books.len(), 1);
    assert_eq!(snapshot.recent_books[1].title, "Middlemarch");
}

#[tokio::test]
async fn missing_user_id_is_a_config_error() {
    let server = MockServer::start().await;
    let store = MemoryStore::with_settings(json!({ "goodreads": { "shelf": "read" } }));

    let err = run_pipeline(&store, &clients(&server.uri()), Integration::Goodreads, None)
        .await
        .expect_err("userId is required");

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn malformed_feed_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/review/list_rss/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<rss><channel></item></rss>"))
        .mount(&server)
        .await;

    let store = MemoryStore::with_settings(json!({ "goodreads": { "userId": "42" } }));
    let err = run_pipeline(&store, &clients(&server.uri()), Integration::Goodreads, None)
        .await
        .expect_err("malformed XML should fail");

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert!(store.snapshots().is_empty());
}

//! Offline asset API tests.

mod common;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;

use common::TestContext;

fn header_str(response: &axum_test::TestResponse, name: HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_precached_asset_served_from_cache() {
    let ctx = TestContext::new().await;
    let response = ctx.server().get("/assets/games.js").await;

    response.assert_status_ok();
    response.assert_text("console.log('games');");
    assert_eq!(header_str(&response, HeaderName::from_static("x-cache")), "hit");
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "text/javascript; charset=utf-8"
    );
    assert!(header_str(&response, header::ETAG).starts_with('"'));
}

#[tokio::test]
async fn test_uncached_asset_goes_to_network() {
    let ctx = TestContext::new().await;
    let response = ctx.server().get("/assets/credits.html").await;

    response.assert_status_ok();
    assert_eq!(header_str(&response, HeaderName::from_static("x-cache")), "miss");
}

#[tokio::test]
async fn test_matching_etag_is_not_modified() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let first = server.get("/assets/sounds/ok.mp3").await;
    let etag = header_str(&first, header::ETAG);

    let second = server
        .get("/assets/sounds/ok.mp3")
        .add_header(
            header::IF_NONE_MATCH,
            HeaderValue::from_str(&etag).unwrap(),
        )
        .await;
    second.assert_status(StatusCode::NOT_MODIFIED);
    assert_eq!(header_str(&second, header::ETAG), etag);
}

#[tokio::test]
async fn test_unknown_asset_is_not_found() {
    let ctx = TestContext::new().await;
    ctx.server()
        .get("/assets/missing.png")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_absolute_urls_are_refused() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    for path in [
        "/assets/http://127.0.0.1:9/secret",
        "/assets/https://pagead2.googlesyndication.com/ad.js",
        "/assets/http:%2F%2F169.254.169.254%2Flatest",
    ] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.headers().get("x-cache").is_none());
    }
}

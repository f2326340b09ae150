//! Static pages, health checks and response headers.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use inkpost_integration_tests::TestApp;

#[tokio::test]
async fn test_static_pages_render() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();

    for (path, text) in [("/about", "About Me"), ("/contact", "Contact Me")] {
        let page = browser.get(path).await;
        assert_eq!(page.status, StatusCode::OK, "{path}");
        assert!(page.body.contains(text), "{path}");
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();

    let live = browser.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = browser.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let app = TestApp::spawn().await;
    let css = app.browser().get("/static/css/main.css").await;
    assert_eq!(css.status, StatusCode::OK);
    assert!(css.body.contains(".site-nav"));
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = TestApp::spawn().await;
    let page = app.browser().get("/").await;

    assert_eq!(page.headers["x-frame-options"], "DENY");
    assert_eq!(page.headers["x-content-type-options"], "nosniff");
    assert!(page.headers.contains_key("content-security-policy"));
    assert_eq!(page.headers["cache-control"], "no-store, max-age=0");
    assert!(page.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_empty_blog_listing() {
    let app = TestApp::spawn().await;
    let page = app.browser().get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Nothing published yet."));
}

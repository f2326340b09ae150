//! Registration, login and logout through the HTTP surface.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use inkpost_blog::db::create_pool;
use inkpost_blog::services::{AuthError, AuthService};
use inkpost_integration_tests::{PASSWORD, TestApp};
use secrecy::SecretString;

#[tokio::test]
async fn test_register_signs_in_and_shows_name() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();

    let resp = browser.register("ada@example.com", "Ada Lovelace").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some("/"));
    assert!(browser.has_cookie());

    let home = browser.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Ada Lovelace"));
    assert!(home.body.contains("Log Out"));
}

#[tokio::test]
async fn test_distinct_emails_get_distinct_users() {
    let app = TestApp::spawn().await;

    for i in 0..5 {
        let mut browser = app.browser();
        let resp = browser
            .register(&format!("user{i}@example.com"), &format!("User {i}"))
            .await;
        assert_eq!(resp.location(), Some("/"));
    }

    assert_eq!(app.count("users").await, 5);
    let distinct: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT id) FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(distinct, 5);
}

#[tokio::test]
async fn test_duplicate_registration_sends_to_login() {
    let app = TestApp::spawn().await;
    app.browser().register("ada@example.com", "Ada").await;

    let mut second = app.browser();
    let resp = second.register("ada@example.com", "Impostor").await;
    assert_eq!(resp.location(), Some("/login?error=already_registered"));
    assert!(!second.has_cookie());
    assert_eq!(app.count("users").await, 1);

    let page = second.get("/login?error=already_registered").await;
    assert!(page.body.contains("already signed up"));
}

#[tokio::test]
async fn test_invalid_registration_input() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();

    let resp = browser
        .post_form(
            "/register",
            &[("email", "not-an-email"), ("name", "X"), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(resp.location(), Some("/register?error=invalid_email"));

    let resp = browser
        .post_form(
            "/register",
            &[("email", "x@example.com"), ("name", "X"), ("password", "short")],
        )
        .await;
    assert_eq!(resp.location(), Some("/register?error=weak_password"));

    let resp = browser
        .post_form(
            "/register",
            &[("email", "x@example.com"), ("name", "   "), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(resp.location(), Some("/register?error=invalid_name"));

    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn test_login_outcomes_are_stable() {
    let app = TestApp::spawn().await;
    app.browser().register("ada@example.com", "Ada").await;

    let mut browser = app.browser();
    for _ in 0..3 {
        let wrong = browser
            .post_form(
                "/login",
                &[("email", "ada@example.com"), ("password", "not-the-password")],
            )
            .await;
        assert_eq!(wrong.location(), Some("/login?error=wrong_password"));

        let unknown = browser.login("nobody@example.com").await;
        assert_eq!(unknown.location(), Some("/login?error=unknown_email"));
    }

    let ok = browser.login("ada@example.com").await;
    assert_eq!(ok.location(), Some("/"));
    assert!(browser.get("/").await.body.contains("Log Out"));

    // Still succeeds after further failures.
    let mut other = app.browser();
    other
        .post_form("/login", &[("email", "ada@example.com"), ("password", "nope-nope")])
        .await;
    assert_eq!(other.login("ada@example.com").await.location(), Some("/"));
}

#[tokio::test]
async fn test_login_messages_render() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();

    let page = browser.get("/login?error=wrong_password").await;
    assert!(page.body.contains("Password incorrect"));

    let page = browser.get("/login?error=unknown_email").await;
    assert!(page.body.contains("That email does not exist"));
}

#[tokio::test]
async fn test_logout_returns_to_anonymous() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();
    browser.register("ada@example.com", "Ada").await;

    let resp = browser.get("/logout").await;
    assert_eq!(resp.location(), Some("/"));

    let home = browser.get("/").await;
    assert!(home.body.contains("Login"));
    assert!(!home.body.contains("Log Out"));

    // Logging out again is harmless.
    let resp = browser.post_form("/logout", &[]).await;
    assert_eq!(resp.location(), Some("/"));
}

#[tokio::test]
async fn test_tampered_cookie_is_anonymous() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();
    browser.register("ada@example.com", "Ada").await;

    browser.set_cookie_value("forged-session-id");
    let home = browser.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(!home.body.contains("Log Out"));
}

#[tokio::test]
async fn test_session_for_deleted_user_is_anonymous() {
    let app = TestApp::spawn().await;
    app.browser().register("owner@example.com", "Owner").await;
    let mut browser = app.browser();
    browser.register("gone@example.com", "Gone Reader").await;
    assert!(browser.get("/").await.body.contains("Gone Reader"));

    sqlx::query("DELETE FROM users WHERE email = ?")
        .bind("gone@example.com")
        .execute(&app.pool)
        .await
        .unwrap();

    let home = browser.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(!home.body.contains("Gone Reader"));
    assert!(!home.body.contains("Log Out"));
    assert!(home.body.contains("Login"));
}

#[tokio::test]
async fn test_login_cycles_session_id() {
    let app = TestApp::spawn().await;
    let mut browser = app.browser();
    browser.register("ada@example.com", "Ada").await;
    let before = browser.cookie_value().unwrap().to_owned();

    let resp = browser.login("ada@example.com").await;
    assert_eq!(resp.location(), Some("/"));
    let after = browser.cookie_value().unwrap().to_owned();
    assert_ne!(before, after);
    assert!(browser.get("/").await.body.contains("Log Out"));

    // The pre-login id no longer authenticates anyone.
    let mut stale = app.browser();
    stale.set_cookie_value(&before);
    let home = stale.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(!home.body.contains("Log Out"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_email_registration_has_one_winner() {
    let path = std::env::temp_dir().join(format!("inkpost-{}.db", uuid::Uuid::new_v4()));
    let url = SecretString::from(format!("sqlite://{}?mode=rwc", path.display()));
    let pool = create_pool(&url).await.unwrap();
    inkpost_blog::db::run_migrations(&pool).await.unwrap();

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                AuthService::new(&pool)
                    .register("race@example.com", &format!("Racer {i}"), PASSWORD)
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut duplicates = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AuthError::UserAlreadyExists) => duplicates += 1,
            Err(e) => panic!("unexpected registration error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(duplicates, 7);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    pool.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

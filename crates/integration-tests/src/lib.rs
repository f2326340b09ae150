//! Integration tests for Inkpost.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`
//! against a private in-memory `SQLite` database, so they need no running
//! server and no external services.
//!
//! ```bash
//! cargo test -p inkpost-integration-tests
//! ```
//!
//! [`TestApp`] owns the database and router; each [`Browser`] keeps its own
//! session cookie, so one test can act as the owner, a reader and an
//! anonymous visitor side by side.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

use inkpost_blog::config::BlogConfig;
use inkpost_blog::db::create_memory_pool;
use inkpost_blog::middleware::create_session_store;
use inkpost_blog::middleware::session::SESSION_COOKIE_NAME;
use inkpost_blog::routes;
use inkpost_blog::state::AppState;

/// Password used for every account created through [`Browser::register`].
pub const PASSWORD: &str = "integration-password";

const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Configuration suitable for tests: plain HTTP, fixed strong secret.
#[must_use]
pub fn test_config() -> BlogConfig {
    BlogConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: [127, 0, 0, 1].into(),
        port: 5000,
        base_url: "http://localhost:5000".to_owned(),
        session_secret: SecretString::from("N7v#q2LxP9w!Rk4zT8m@Hc3yJ6b^Fd1s"),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The application under test.
pub struct TestApp {
    pub pool: SqlitePool,
    router: Router,
}

impl TestApp {
    /// Build the full router over a fresh, migrated in-memory database.
    pub async fn spawn() -> Self {
        let pool = create_memory_pool().await.unwrap();
        let session_store = create_session_store(&pool).await.unwrap();
        let router = routes::app(AppState::new(test_config(), pool.clone()), session_store);
        Self { pool, router }
    }

    /// A new visitor with no cookies.
    #[must_use]
    pub fn browser(&self) -> Browser {
        Browser {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Count rows in a table.
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// A simulated browser holding at most one session cookie.
pub struct Browser {
    router: Router,
    cookie: Option<String>,
}

/// What came back from a request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The redirect target, if this is a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl Browser {
    /// Issue a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Submit a urlencoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Register and (implicitly) sign in.
    pub async fn register(&mut self, email: &str, name: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[("email", email), ("name", name), ("password", PASSWORD)],
        )
        .await
    }

    /// Sign in with the shared test password.
    pub async fn login(&mut self, email: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", PASSWORD)])
            .await
    }

    /// Publish a post with placeholder content and the given title.
    pub async fn create_post(&mut self, title: &str) -> TestResponse {
        self.post_form(
            "/new-post",
            &[
                ("title", title),
                ("subtitle", "Subtitle"),
                ("img_url", "https://images.example.com/header.jpg"),
                ("body", "<p>Body text</p>"),
            ],
        )
        .await
    }

    /// Replace the current session cookie value.
    pub fn set_cookie_value(&mut self, value: &str) {
        self.cookie = Some(format!("{SESSION_COOKIE_NAME}={value}"));
    }

    /// The current session cookie value, without the name.
    #[must_use]
    pub fn cookie_value(&self) -> Option<&str> {
        self.cookie
            .as_deref()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value)
    }

    /// Whether the browser currently holds a session cookie.
    #[must_use]
    pub const fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else {
                continue;
            };
            let Some((name, cookie_value)) = pair.split_once('=') else {
                continue;
            };
            if name.trim() != SESSION_COOKIE_NAME {
                continue;
            }
            let removed = cookie_value.is_empty() || value.contains("Max-Age=0");
            self.cookie = if removed { None } else { Some(pair.trim().to_owned()) };
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

//! HTTP route handlers for the blog.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Post listing
//! GET  /post/{id}         - Post with comments
//! POST /post/{id}         - Add a comment (signed in)
//!
//! # Owner only (RequireOwner, otherwise redirect to /forbidden)
//! GET  /new-post          - New post form
//! POST /new-post          - Publish post
//! GET  /edit-post/{id}    - Edit form, prefilled
//! POST /edit-post/{id}    - Save edits
//! POST /delete/{id}       - Delete post and its comments
//!
//! # Auth
//! GET  /register          - Register page
//! POST /register          - Register and sign in
//! GET  /login             - Login page
//! POST /login             - Login action
//! GET  /logout            - Logout (link)
//! POST /logout            - Logout (form)
//!
//! # Pages
//! GET  /about, /contact   - Static pages
//! GET  /forbidden         - 403 page
//! GET  /health            - Liveness
//! GET  /health/ready      - Database readiness
//! GET  /static/*          - CSS and images
//! ```

pub mod auth;
pub mod pages;
pub mod posts;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::models::{CurrentUser, Identity};
use crate::services::access;
use crate::state::AppState;

/// Navigation data every page template renders.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user: Option<CurrentUser>,
    pub is_owner: bool,
}

impl From<&Identity> for Viewer {
    fn from(identity: &Identity) -> Self {
        Self {
            user: identity.user().cloned(),
            is_owner: access::require_owner(identity).is_allowed(),
        }
    }
}

impl From<&CurrentUser> for Viewer {
    fn from(user: &CurrentUser) -> Self {
        Self::from(&Identity::Authenticated(user.clone()))
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the post and comment routes router.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::index))
        .route("/post/{id}", get(posts::show).post(posts::comment))
        .route("/new-post", get(posts::new_post_page).post(posts::create))
        .route("/edit-post/{id}", get(posts::edit_page).post(posts::update))
        .route("/delete/{id}", post(posts::delete))
}

/// Create all page routes for the blog.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(post_routes())
        .merge(auth_routes())
        .merge(pages::router())
}

/// Assemble the full application: routes, static files, sessions and the
/// per-request middleware.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState, session_store: SqliteStore) -> Router {
    let session_layer = create_session_layer(session_store, state.config());

    Router::new()
        .route("/health", get(pages::health))
        .route("/health/ready", get(pages::readiness))
        .merge(routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

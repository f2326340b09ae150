//! Static page and health check handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use super::Viewer;
use crate::error::AppError;
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub viewer: Viewer,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub viewer: Viewer,
}

/// Forbidden page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/forbidden.html")]
pub struct ForbiddenTemplate {
    pub viewer: Viewer,
}

/// Display the about page.
pub async fn about(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
    AboutTemplate {
        viewer: Viewer::from(&identity),
    }
}

/// Display the contact page.
pub async fn contact(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
    ContactTemplate {
        viewer: Viewer::from(&identity),
    }
}

/// The page owner-only routes redirect to, served with 403.
pub async fn forbidden(
    identity: Result<CurrentIdentity, AppError>,
) -> impl IntoResponse {
    let viewer = identity
        .map(|CurrentIdentity(identity)| Viewer::from(&identity))
        .unwrap_or_default();
    (StatusCode::FORBIDDEN, ForbiddenTemplate { viewer })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Create the pages routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/forbidden", get(forbidden))
}

//! Authentication route handlers.
//!
//! Registration signs the new user in straight away. Form errors come back to
//! the same page as an `?error=` code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Viewer;
use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CurrentIdentity, end_session, establish_session};
use crate::models::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub viewer: Viewer,
    pub error: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub viewer: Viewer,
    pub error: Option<&'static str>,
}

fn login_message(code: &str) -> Option<&'static str> {
    match code {
        "unknown_email" => Some("That email does not exist, please try again."),
        "wrong_password" => Some("Password incorrect, please try again."),
        "already_registered" => Some("You've already signed up with that email, log in instead!"),
        "login_to_comment" => Some("You need to login or register to comment."),
        _ => None,
    }
}

fn register_message(code: &str) -> Option<&'static str> {
    match code {
        "invalid_email" => Some("Please enter a valid email address."),
        "invalid_name" => Some("Please enter a name of at most 250 characters."),
        "weak_password" => Some("Passwords must be at least 8 characters long."),
        _ => None,
    }
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        viewer: Viewer::from(&identity),
        error: query.error.as_deref().and_then(login_message),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            add_breadcrumb("auth", "Logged in", None);
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials(reason)) => {
            tracing::info!(reason = reason.code(), "login rejected");
            Ok(Redirect::to(&format!("/login?error={}", reason.code())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        viewer: Viewer::from(&identity),
        error: query.error.as_deref().and_then(register_message),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let result = AuthService::new(state.pool())
        .register(&form.email, &form.name, &form.password)
        .await;

    let redirect = match result {
        Ok(user) => {
            sign_in(&session, &user).await?;
            add_breadcrumb("auth", "Registered", None);
            "/"
        }
        Err(AuthError::UserAlreadyExists) => "/login?error=already_registered",
        Err(AuthError::InvalidEmail(_)) => "/register?error=invalid_email",
        Err(AuthError::InvalidDisplayName(_)) => "/register?error=invalid_name",
        Err(AuthError::WeakPassword(_)) => "/register?error=weak_password",
        Err(e) => return Err(e.into()),
    };

    Ok(Redirect::to(redirect).into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out unconditionally and go back to the post list.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    end_session(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

async fn sign_in(session: &Session, user: &User) -> Result<(), AppError> {
    establish_session(session, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "session established");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_codes_render_nothing() {
        assert!(login_message("<script>").is_none());
        assert!(register_message("wrong_password").is_none());
        assert!(login_message("wrong_password").is_some());
    }
}

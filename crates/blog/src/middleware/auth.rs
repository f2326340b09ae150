//! Identity resolution and route guards.
//!
//! The session holds only a user id. [`CurrentIdentity`] turns it back into an
//! [`Identity`] on every request by reading the users table; [`RequireOwner`]
//! rejects before the handler body runs.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use inkpost_core::UserId;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, Identity, User, session_keys};
use crate::services::access::{self, Access};
use crate::state::AppState;

/// Extractor for the identity making the request.
///
/// Never rejects for a missing, malformed or stale session; those resolve to
/// [`Identity::Anonymous`]. Only a database failure is an error.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
///     match identity.user() {
///         Some(user) => format!("Hello, {}!", user.display_name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct CurrentIdentity(pub Identity);

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(Self(identity.clone()));
        }

        let identity = match parts.extensions.get::<Session>() {
            Some(session) => resolve_identity(session, state).await?,
            None => Identity::Anonymous,
        };

        parts.extensions.insert(identity.clone());
        Ok(Self(identity))
    }
}

async fn resolve_identity(session: &Session, state: &AppState) -> Result<Identity, AppError> {
    let user_id = match session.get::<UserId>(session_keys::USER_ID).await {
        Ok(Some(id)) => id,
        Ok(None) => return Ok(Identity::Anonymous),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable session, treating as anonymous");
            return Ok(Identity::Anonymous);
        }
    };

    let user = UserRepository::new(state.pool()).get_by_id(user_id).await?;
    if user.is_none() {
        tracing::debug!(%user_id, "session refers to a missing user");
    }

    Ok(user.map(CurrentUser::from).into())
}

/// Extractor that only lets the blog owner through.
///
/// Anonymous visitors and signed-in non-owners are both redirected to the
/// forbidden page without the handler running.
pub struct RequireOwner(pub CurrentUser);

/// Rejection for [`RequireOwner`].
pub enum OwnerRejection {
    /// The identity is not the owner.
    Forbidden,
    /// Identity resolution failed.
    Internal(AppError),
}

impl IntoResponse for OwnerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Forbidden => Redirect::to("/forbidden").into_response(),
            Self::Internal(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = OwnerRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state)
            .await
            .map_err(OwnerRejection::Internal)?;

        match (access::require_owner(&identity), identity) {
            (Access::Allow, Identity::Authenticated(user)) => Ok(Self(user)),
            _ => {
                tracing::info!(path = %parts.uri.path(), "owner-only route denied");
                Err(OwnerRejection::Forbidden)
            }
        }
    }
}

/// Bind the session to a user after registration or login.
///
/// The session id is cycled first so an id planted before authentication is
/// never promoted.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn establish_session(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::USER_ID, user.id).await
}

/// Destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session record cannot be deleted.
pub async fn end_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

//! Session-related types.
//!
//! The session itself stores only a [`UserId`]; the [`Identity`] for a request
//! is rebuilt from the users table every time so a stale or forged id simply
//! resolves to [`Identity::Anonymous`].

use inkpost_core::{Email, UserId};

use super::User;

/// The signed-in user for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's display name, read fresh from the database.
    pub display_name: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

/// Who is making a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// No session, or a session that no longer maps to a user.
    #[default]
    Anonymous,
    /// A session bound to an existing user.
    Authenticated(CurrentUser),
}

impl Identity {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<CurrentUser> for Identity {
    fn from(user: CurrentUser) -> Self {
        Self::Authenticated(user)
    }
}

impl From<Option<CurrentUser>> for Identity {
    fn from(user: Option<CurrentUser>) -> Self {
        user.map_or(Self::Anonymous, Self::Authenticated)
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the signed-in user's id.
    pub const USER_ID: &str = "user_id";
}

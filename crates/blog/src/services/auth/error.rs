//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Why a login attempt was rejected.
///
/// Both reasons are reported under the single [`AuthError::InvalidCredentials`]
/// kind and take the same amount of work to produce; the distinction exists
/// only to pick the message shown on the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    /// No account is registered under the submitted email.
    UnknownEmail,
    /// The account exists but the password does not match.
    WrongPassword,
}

impl CredentialFailure {
    /// Short code used in redirect query strings.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnknownEmail => "unknown_email",
            Self::WrongPassword => "wrong_password",
        }
    }
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] inkpost_core::EmailError),

    /// Display name is empty or too long.
    #[error("invalid display name: {0}")]
    InvalidDisplayName(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials(CredentialFailure),

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

//! Authentication service.
//!
//! Registration and password login against the credential store. Passwords
//! are hashed with Argon2id and a per-user random salt; only the PHC string is
//! ever persisted.

mod error;

pub use error::{AuthError, CredentialFailure};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use inkpost_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display name length (in characters).
const MAX_DISPLAY_NAME_LENGTH: usize = 250;

/// Hash verified when the submitted email is unknown, so that a miss costs
/// the same Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("inkpost-timing-equalizer").ok());

/// Authentication service.
///
/// Handles user registration, login, and user lookup.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email, display name and password.
    ///
    /// Nothing is written unless every check passes; the insert itself is a
    /// single statement, so a duplicate email never leaves a partial row.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidDisplayName` if the name is empty or too long.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email.trim())?;
        let display_name = validate_display_name(display_name)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, display_name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong. Both cases perform one Argon2 verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email.trim()) else {
            burn_verification(password);
            return Err(AuthError::InvalidCredentials(
                CredentialFailure::UnknownEmail,
            ));
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            burn_verification(password);
            return Err(AuthError::InvalidCredentials(
                CredentialFailure::UnknownEmail,
            ));
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        self.users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn find_by_id(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate a display name, returning it trimmed.
fn validate_display_name(display_name: &str) -> Result<&str, AuthError> {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidDisplayName(
            "display name cannot be empty".to_owned(),
        ));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AuthError::InvalidDisplayName(format!(
            "display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let invalid = AuthError::InvalidCredentials(CredentialFailure::WrongPassword);
    let parsed_hash = PasswordHash::new(hash).map_err(|_| {
        tracing::error!("stored password hash is not a valid PHC string");
        AuthError::PasswordHash
    })?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid)
}

/// Spend one verification's worth of work on a login that is already failing.
fn burn_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[test]
    fn test_hash_is_salted_phc_string() {
        let first = hash_password("correct horse battery").unwrap();
        let second = hash_password("correct horse battery").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second, "each hash gets its own salt");
        assert!(!first.contains("correct horse battery"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse battery", &hash),
            Err(AuthError::InvalidCredentials(
                CredentialFailure::WrongPassword
            ))
        ));
    }

    #[test]
    fn test_verify_rejects_corrupt_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_validate_display_name() {
        assert_eq!(validate_display_name("  Ada  ").unwrap(), "Ada");
        assert!(matches!(
            validate_display_name("   "),
            Err(AuthError::InvalidDisplayName(_))
        ));
        assert!(matches!(
            validate_display_name(&"x".repeat(251)),
            Err(AuthError::InvalidDisplayName(_))
        ));
    }

    #[test]
    fn test_credential_failure_codes() {
        assert_eq!(CredentialFailure::UnknownEmail.code(), "unknown_email");
        assert_eq!(CredentialFailure::WrongPassword.code(), "wrong_password");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);

        let user = auth
            .register("ada@example.com", "Ada", "analytical-engine")
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "ada@example.com");
        assert_eq!(user.display_name, "Ada");

        let logged_in = auth
            .login("ada@example.com", "analytical-engine")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_share_one_kind() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);
        auth.register("ada@example.com", "Ada", "analytical-engine")
            .await
            .unwrap();

        assert!(matches!(
            auth.login("nobody@example.com", "analytical-engine").await,
            Err(AuthError::InvalidCredentials(
                CredentialFailure::UnknownEmail
            ))
        ));
        assert!(matches!(
            auth.login("ada@example.com", "difference-engine").await,
            Err(AuthError::InvalidCredentials(
                CredentialFailure::WrongPassword
            ))
        ));
        assert!(matches!(
            auth.login("not an email", "analytical-engine").await,
            Err(AuthError::InvalidCredentials(
                CredentialFailure::UnknownEmail
            ))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_without_writing() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);
        auth.register("ada@example.com", "Ada", "analytical-engine")
            .await
            .unwrap();

        let result = auth
            .register("ada@example.com", "Someone Else", "another-password")
            .await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));

        let count = UserRepository::new(&pool).count().await.unwrap();
        assert_eq!(count, 1);

        // The original password still works; nothing was overwritten.
        assert!(
            auth.login("ada@example.com", "analytical-engine")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);
        auth.register("Ada@example.com", "Ada", "analytical-engine")
            .await
            .unwrap();

        assert!(matches!(
            auth.find_by_email("ada@example.com").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(auth.find_by_email("Ada@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);
        let user = auth
            .register("ada@example.com", "Ada", "analytical-engine")
            .await
            .unwrap();

        assert_eq!(auth.find_by_id(user.id).await.unwrap(), user);
        assert!(matches!(
            auth.find_by_id(UserId::new(999)).await,
            Err(AuthError::UserNotFound)
        ));
    }
}

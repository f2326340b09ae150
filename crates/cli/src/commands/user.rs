//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! INKPOST_USER_PASSWORD='correct horse battery staple' \
//!     inkpost-cli user create -e me@example.com -n "My Name"
//! ```
//!
//! The password comes from the environment rather than a flag so it never
//! lands in shell history or `ps` output. Registering on a fresh database is
//! how the owner account (id 1) gets claimed before the site goes public.

use secrecy::{ExposeSecret, SecretString};

use inkpost_blog::services::{AuthError, AuthService, OWNER_ID};
use inkpost_blog::{config, db};

/// Environment variable holding the new user's password.
const PASSWORD_ENV: &str = "INKPOST_USER_PASSWORD";

/// Errors that can occur during user management.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not create user: {0}")]
    Auth(#[from] AuthError),
}

/// Register a user from the terminal.
///
/// # Errors
///
/// Returns `UserError` if the password is missing, the input is invalid, or
/// the email is already registered.
pub async fn create_user(email: &str, name: &str) -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    let password = std::env::var(PASSWORD_ENV)
        .map(SecretString::from)
        .map_err(|_| UserError::MissingEnvVar(PASSWORD_ENV))?;

    tracing::info!("Connecting to blog database...");
    let pool = db::create_pool(&config::database_url_from_env()).await?;
    db::run_migrations(&pool).await?;

    let user = AuthService::new(&pool)
        .register(email, name, password.expose_secret())
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    if user.id == OWNER_ID {
        tracing::info!("This account owns the blog and can manage posts.");
    }

    Ok(())
}

//! Session middleware configuration.
//!
//! Sets up `SQLite`-backed, signed-cookie sessions using tower-sessions.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::SqlitePool;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::BlogConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "inkpost_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session store and its table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the `tower_sessions` table cannot be created.
pub async fn create_session_store(pool: &SqlitePool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Create the session layer around an existing store.
///
/// The cookie is signed with a 64-byte key derived from `BLOG_SESSION_SECRET`,
/// so a tampered session id is rejected before the store is consulted.
#[must_use]
pub fn create_session_layer(
    store: SqliteStore,
    config: &BlogConfig,
) -> SessionManagerLayer<SqliteStore, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}

fn signing_key(config: &BlogConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config_with_secret(secret: &str) -> BlogConfig {
        BlogConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: [127, 0, 0, 1].into(),
            port: 5000,
            base_url: "http://localhost:5000".to_owned(),
            session_secret: SecretString::from(secret),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_signing_key_is_deterministic() {
        let a = signing_key(&config_with_secret("kq8Zt2vNw4Lr7Yp1Xc6Hb9Mf3Jd5Sg0A"));
        let b = signing_key(&config_with_secret("kq8Zt2vNw4Lr7Yp1Xc6Hb9Mf3Jd5Sg0A"));
        let c = signing_key(&config_with_secret("Pz4Wm8Qx1Rn6Vt3Ky9Bc2Ld7Gf5Hj0Ns"));

        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}

//! Database migration command.
//!
//! The server applies the same embedded migrations on startup; this command
//! exists to prepare a database ahead of a deploy.
//!
//! # Environment Variables
//!
//! - `BLOG_DATABASE_URL` (or `DATABASE_URL`) - `SQLite` connection string

use inkpost_blog::{config, db};

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Apply all pending migrations to the configured database.
///
/// # Errors
///
/// Returns `MigrationError` if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    tracing::info!("Connecting to blog database...");
    let pool = db::create_pool(&config::database_url_from_env()).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    let applied = db::MIGRATOR.iter().count();
    tracing::info!("Migrations complete! ({applied} in total)");
    Ok(())
}

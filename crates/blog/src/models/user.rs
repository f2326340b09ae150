//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use inkpost_core::{Email, UserId};

/// A registered blog user (domain type).
///
/// The password hash is deliberately absent: it only leaves the credential
/// store for verification inside the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID. The first registered user (id 1) owns the blog.
    pub id: UserId,
    /// User's email address, unique and stored exactly as entered.
    pub email: Email,
    /// Name shown next to the user's comments and posts.
    pub display_name: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

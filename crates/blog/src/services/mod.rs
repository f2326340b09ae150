//! Business logic services for the blog.
//!
//! # Services
//!
//! - `access` - Owner and authenticated-user gates
//! - `auth` - Registration and password login
//! - `posts` - Post publishing and comments

pub mod access;
pub mod auth;
pub mod posts;

pub use access::{Access, OWNER_ID};
pub use auth::{AuthError, AuthService, CredentialFailure};
pub use posts::{PostError, PostService};

//! Domain models for the blog.
//!
//! Relationships are expressed through identifiers (`author_id`, `post_id`);
//! read models such as [`PostWithAuthor`] carry the joined display data.

pub mod post;
pub mod session;
pub mod user;

pub use post::{Comment, CommentWithAuthor, Post, PostDraft, PostWithAuthor};
pub use session::{CurrentUser, Identity, session_keys};
pub use user::User;

//! Post and comment domain types.

use inkpost_core::{CommentId, PostId, UserId};

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    /// The owner who wrote the post. Never changes after creation.
    pub author_id: UserId,
    pub title: String,
    pub subtitle: String,
    /// Rich-text HTML produced by the editor.
    pub body: String,
    /// URL of the header image.
    pub image_reference: String,
    /// Human-readable date (e.g. "October 15, 2026"), fixed at creation.
    pub published_date: String,
}

/// The editable fields of a post, as submitted by the post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub image_reference: String,
}

impl PostDraft {
    /// Trim surrounding whitespace and report the first empty required field.
    ///
    /// # Errors
    ///
    /// Returns the name of the first field that is empty after trimming.
    pub fn normalized(self) -> Result<Self, &'static str> {
        let draft = Self {
            title: self.title.trim().to_owned(),
            subtitle: self.subtitle.trim().to_owned(),
            body: self.body.trim().to_owned(),
            image_reference: self.image_reference.trim().to_owned(),
        };

        if draft.title.is_empty() {
            return Err("title");
        }
        if draft.subtitle.is_empty() {
            return Err("subtitle");
        }
        if draft.body.is_empty() {
            return Err("body");
        }
        if draft.image_reference.is_empty() {
            return Err("image_reference");
        }

        Ok(draft)
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            body: post.body.clone(),
            image_reference: post.image_reference.clone(),
        }
    }
}

/// A post joined with its author's current display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author_name: String,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author_id: UserId,
    pub post_id: PostId,
}

/// A comment joined with the commenter's display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_name: String,
    /// Used to derive the commenter's avatar.
    pub author_email: String,
}

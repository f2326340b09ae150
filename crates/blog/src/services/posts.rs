//! Post and comment orchestration.
//!
//! Every mutating operation takes the caller's [`Identity`] explicitly and
//! runs its access check first, before input validation and before any store
//! access. A denied call leaves the database untouched.

use chrono::Local;
use sqlx::SqlitePool;
use thiserror::Error;

use inkpost_core::PostId;

use super::access::{self, Access};
use crate::db::{CommentRepository, PostRepository, RepositoryError};
use crate::models::{Comment, CommentWithAuthor, Identity, Post, PostDraft, PostWithAuthor};

/// Format of `Post::published_date`, e.g. "October 15, 2026".
pub const PUBLISHED_DATE_FORMAT: &str = "%B %d, %Y";

/// The server's local calendar date, as stamped on new posts.
fn today() -> String {
    Local::now().format(PUBLISHED_DATE_FORMAT).to_string()
}

/// Errors from post and comment operations.
#[derive(Debug, Error)]
pub enum PostError {
    /// The identity is not allowed to perform the operation.
    #[error("access denied")]
    Denied,

    /// The referenced post does not exist.
    #[error("post not found")]
    NotFound,

    /// Another post already uses this title.
    #[error("a post with this title already exists")]
    DuplicateTitle,

    /// A required field is missing or blank.
    #[error("missing required field: {0}")]
    Invalid(&'static str),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for PostError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::DuplicateTitle,
            other => Self::Repository(other),
        }
    }
}

impl PostError {
    /// Short code used in redirect query strings.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Denied => "denied",
            Self::NotFound => "not_found",
            Self::DuplicateTitle => "duplicate_title",
            Self::Invalid("text") => "empty_comment",
            Self::Invalid(_) => "missing_field",
            Self::Repository(_) => "internal",
        }
    }
}

fn gate(access: Access) -> Result<(), PostError> {
    match access {
        Access::Allow => Ok(()),
        Access::Deny => Err(PostError::Denied),
    }
}

/// Post and comment service.
pub struct PostService<'a> {
    posts: PostRepository<'a>,
    comments: CommentRepository<'a>,
}

impl<'a> PostService<'a> {
    /// Create a new post service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            posts: PostRepository::new(pool),
            comments: CommentRepository::new(pool),
        }
    }

    /// All posts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Repository` if the query fails.
    pub async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, PostError> {
        Ok(self.posts.list().await?)
    }

    /// A single post with its author's name.
    ///
    /// # Errors
    ///
    /// Returns `PostError::NotFound` if no post has this id.
    pub async fn get_post(&self, post_id: PostId) -> Result<PostWithAuthor, PostError> {
        self.posts
            .get_with_author(post_id)
            .await?
            .ok_or(PostError::NotFound)
    }

    /// Comments on a post, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PostError::NotFound` if the post doesn't exist, including
    /// after it has been deleted.
    pub async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentWithAuthor>, PostError> {
        if self.posts.get(post_id).await?.is_none() {
            return Err(PostError::NotFound);
        }
        Ok(self.comments.list_for_post(post_id).await?)
    }

    /// Publish a new post as the owner, dated today.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Denied` unless the identity is the owner.
    /// Returns `PostError::Invalid` naming the first blank field.
    /// Returns `PostError::DuplicateTitle` if the title is taken.
    #[tracing::instrument(skip(self, identity, draft), fields(title = %draft.title))]
    pub async fn create_post(&self, identity: &Identity, draft: PostDraft) -> Result<Post, PostError> {
        gate(access::require_owner(identity))?;
        let Some(author) = identity.user() else {
            return Err(PostError::Denied);
        };

        let draft = draft.normalized().map_err(PostError::Invalid)?;
        let published_date = today();

        let post = self.posts.create(author.id, &draft, &published_date).await?;
        tracing::info!(post_id = %post.id, "post created");
        Ok(post)
    }

    /// Replace a post's title, subtitle, body and image.
    ///
    /// The author and publication date are kept.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Denied` unless the identity is the owner.
    /// Returns `PostError::Invalid` naming the first blank field.
    /// Returns `PostError::NotFound` if the post doesn't exist.
    /// Returns `PostError::DuplicateTitle` if another post has the new title.
    #[tracing::instrument(skip(self, identity, draft), fields(post_id = %post_id))]
    pub async fn edit_post(
        &self,
        identity: &Identity,
        post_id: PostId,
        draft: PostDraft,
    ) -> Result<Post, PostError> {
        gate(access::require_owner(identity))?;

        let draft = draft.normalized().map_err(PostError::Invalid)?;

        let post = self.posts.update(post_id, &draft).await?;
        tracing::info!("post edited");
        Ok(post)
    }

    /// Delete a post together with all of its comments.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Denied` unless the identity is the owner.
    /// Returns `PostError::NotFound` if the post doesn't exist.
    #[tracing::instrument(skip(self, identity), fields(post_id = %post_id))]
    pub async fn delete_post(&self, identity: &Identity, post_id: PostId) -> Result<(), PostError> {
        gate(access::require_owner(identity))?;

        let removed_comments = self.posts.delete(post_id).await?;
        tracing::info!(removed_comments, "post deleted");
        Ok(())
    }

    /// Add a comment to a post as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Denied` for anonymous requests.
    /// Returns `PostError::Invalid("text")` if the comment is blank.
    /// Returns `PostError::NotFound` if the post doesn't exist.
    #[tracing::instrument(skip(self, identity, text), fields(post_id = %post_id))]
    pub async fn add_comment(
        &self,
        identity: &Identity,
        post_id: PostId,
        text: &str,
    ) -> Result<Comment, PostError> {
        gate(access::require_authenticated(identity))?;
        let Some(author) = identity.user() else {
            return Err(PostError::Denied);
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(PostError::Invalid("text"));
        }

        let comment = self.comments.create(post_id, author.id, text).await?;
        tracing::info!(comment_id = %comment.id, user_id = %author.id, "comment added");
        Ok(comment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::models::CurrentUser;
    use crate::services::auth::AuthService;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_owned(),
            subtitle: "A subtitle".to_owned(),
            body: "<p>Hello</p>".to_owned(),
            image_reference: "https://images.example.com/header.jpg".to_owned(),
        }
    }

    async fn setup() -> (SqlitePool, Identity, Identity) {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);
        let owner = auth
            .register("owner@example.com", "Owner", "owner-password")
            .await
            .unwrap();
        let reader = auth
            .register("reader@example.com", "Reader", "reader-password")
            .await
            .unwrap();
        (
            pool,
            CurrentUser::from(owner).into(),
            CurrentUser::from(reader).into(),
        )
    }

    #[test]
    fn test_repository_errors_map_to_domain_errors() {
        assert!(matches!(
            PostError::from(RepositoryError::NotFound),
            PostError::NotFound
        ));
        assert!(matches!(
            PostError::from(RepositoryError::Conflict("title".to_owned())),
            PostError::DuplicateTitle
        ));
        assert!(matches!(
            PostError::from(RepositoryError::DataCorruption("x".to_owned())),
            PostError::Repository(_)
        ));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(PostError::Invalid("text").code(), "empty_comment");
        assert_eq!(PostError::Invalid("title").code(), "missing_field");
        assert_eq!(PostError::DuplicateTitle.code(), "duplicate_title");
    }

    #[tokio::test]
    async fn test_owner_creates_post_with_date() {
        let (pool, owner, _) = setup().await;
        let service = PostService::new(&pool);

        let post = service.create_post(&owner, draft("First")).await.unwrap();
        assert_eq!(post.title, "First");
        assert_eq!(post.author_id, access::OWNER_ID);
        assert_eq!(
            post.published_date,
            Local::now().date_naive().format(PUBLISHED_DATE_FORMAT).to_string()
        );

        let listed = service.list_posts().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].author_name, "Owner");
    }

    #[tokio::test]
    async fn test_denied_before_validation() {
        let (pool, _, reader) = setup().await;
        let service = PostService::new(&pool);

        let mut blank = draft("");
        blank.body = String::new();
        assert!(matches!(
            service.create_post(&reader, blank).await,
            Err(PostError::Denied)
        ));
        assert!(matches!(
            service.edit_post(&Identity::Anonymous, PostId::new(99), draft("x")).await,
            Err(PostError::Denied)
        ));
        assert_eq!(PostRepository::new(&pool).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_title() {
        let (pool, owner, _) = setup().await;
        let service = PostService::new(&pool);

        let first = service.create_post(&owner, draft("Same")).await.unwrap();
        assert!(matches!(
            service.create_post(&owner, draft("Same")).await,
            Err(PostError::DuplicateTitle)
        ));

        let second = service.create_post(&owner, draft("Other")).await.unwrap();
        assert!(matches!(
            service.edit_post(&owner, second.id, draft("Same")).await,
            Err(PostError::DuplicateTitle)
        ));

        // Re-saving a post under its own title is fine.
        assert!(service.edit_post(&owner, first.id, draft("Same")).await.is_ok());
    }

    #[tokio::test]
    async fn test_edit_keeps_author_and_date() {
        let (pool, owner, _) = setup().await;
        let service = PostService::new(&pool);
        let post = service.create_post(&owner, draft("Before")).await.unwrap();

        let mut changed = draft("After");
        changed.subtitle = "New subtitle".to_owned();
        let edited = service.edit_post(&owner, post.id, changed).await.unwrap();

        assert_eq!(edited.title, "After");
        assert_eq!(edited.subtitle, "New subtitle");
        assert_eq!(edited.author_id, post.author_id);
        assert_eq!(edited.published_date, post.published_date);
    }

    #[tokio::test]
    async fn test_comments_and_cascade_delete() {
        let (pool, owner, reader) = setup().await;
        let service = PostService::new(&pool);
        let post = service.create_post(&owner, draft("Talk")).await.unwrap();

        service.add_comment(&reader, post.id, "first!").await.unwrap();
        service.add_comment(&owner, post.id, "  thanks  ").await.unwrap();

        let comments = service.list_comments(post.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author_name, "Reader");
        assert_eq!(comments[1].comment.text, "thanks");

        service.delete_post(&owner, post.id).await.unwrap();
        assert!(matches!(
            service.list_comments(post.id).await,
            Err(PostError::NotFound)
        ));
        assert_eq!(
            CommentRepository::new(&pool).count_for_post(post.id).await.unwrap(),
            0
        );
        assert!(matches!(
            service.delete_post(&owner, post.id).await,
            Err(PostError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_comment_rules() {
        let (pool, owner, reader) = setup().await;
        let service = PostService::new(&pool);
        let post = service.create_post(&owner, draft("Rules")).await.unwrap();

        assert!(matches!(
            service.add_comment(&Identity::Anonymous, post.id, "hi").await,
            Err(PostError::Denied)
        ));
        assert!(matches!(
            service.add_comment(&reader, post.id, "   ").await,
            Err(PostError::Invalid("text"))
        ));
        assert!(matches!(
            service.add_comment(&reader, PostId::new(404), "hi").await,
            Err(PostError::NotFound)
        ));
        assert_eq!(
            CommentRepository::new(&pool).count_for_post(post.id).await.unwrap(),
            0
        );
    }
}

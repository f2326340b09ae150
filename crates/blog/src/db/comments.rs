//! Comment repository for database operations.

use sqlx::{FromRow, SqlitePool};

use inkpost_core::{CommentId, PostId, UserId};

use super::RepositoryError;
use crate::models::{Comment, CommentWithAuthor};

#[derive(Debug, FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    user_id: i64,
    post_id: i64,
}

#[derive(Debug, FromRow)]
struct CommentWithAuthorRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_name: String,
    author_email: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::new(row.id),
            text: row.text,
            author_id: UserId::new(row.user_id),
            post_id: PostId::new(row.post_id),
        }
    }
}

/// Repository for comment database operations.
pub struct CommentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a comment on a post.
    ///
    /// The insert selects the parent post in the same statement, so a comment
    /// can never be attached to a post that is concurrently being deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        post_id: PostId,
        author_id: UserId,
        text: &str,
    ) -> Result<Comment, RepositoryError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r"
            INSERT INTO comments (text, user_id, post_id)
            SELECT ?, ?, id FROM posts WHERE id = ?
            RETURNING id, text, user_id, post_id
            ",
        )
        .bind(text)
        .bind(author_id.as_i64())
        .bind(post_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Comment::from).ok_or(RepositoryError::NotFound)
    }

    /// List a post's comments with commenter details, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_post(
        &self,
        post_id: PostId,
    ) -> Result<Vec<CommentWithAuthor>, RepositoryError> {
        let rows = sqlx::query_as::<_, CommentWithAuthorRow>(
            r"
            SELECT c.id, c.text, c.user_id, c.post_id,
                   u.display_name AS author_name,
                   u.email AS author_email
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = ?
            ORDER BY c.id ASC
            ",
        )
        .bind(post_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CommentWithAuthor {
                comment: r.comment.into(),
                author_name: r.author_name,
                author_email: r.author_email,
            })
            .collect())
    }

    /// Count comments attached to a post, whether or not the post still exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_post(&self, post_id: PostId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id.as_i64())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

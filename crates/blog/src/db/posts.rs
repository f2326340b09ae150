//! Post repository for database operations.

use sqlx::{FromRow, SqlitePool};

use inkpost_core::{PostId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Post, PostDraft, PostWithAuthor};

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    title: String,
    subtitle: String,
    body: String,
    image_reference: String,
    published_date: String,
}

#[derive(Debug, FromRow)]
struct PostWithAuthorRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_name: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::new(row.id),
            author_id: UserId::new(row.author_id),
            title: row.title,
            subtitle: row.subtitle,
            body: row.body,
            image_reference: row.image_reference,
            published_date: row.published_date,
        }
    }
}

impl From<PostWithAuthorRow> for PostWithAuthor {
    fn from(row: PostWithAuthorRow) -> Self {
        Self {
            post: row.post.into(),
            author_name: row.author_name,
        }
    }
}

/// Repository for post database operations.
pub struct PostRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all posts with their author's display name, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PostWithAuthor>, RepositoryError> {
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r"
            SELECT p.id, p.author_id, p.title, p.subtitle, p.body,
                   p.image_reference, p.published_date,
                   u.display_name AS author_name
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r"
            SELECT id, author_id, title, subtitle, body, image_reference, published_date
            FROM posts
            WHERE id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    /// Get a post by ID together with its author's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_author(
        &self,
        id: PostId,
    ) -> Result<Option<PostWithAuthor>, RepositoryError> {
        let row = sqlx::query_as::<_, PostWithAuthorRow>(
            r"
            SELECT p.id, p.author_id, p.title, p.subtitle, p.body,
                   p.image_reference, p.published_date,
                   u.display_name AS author_name
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = ?
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(PostWithAuthor::from))
    }

    /// Create a new post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the title is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        author_id: UserId,
        draft: &PostDraft,
        published_date: &str,
    ) -> Result<Post, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r"
            INSERT INTO posts (author_id, title, subtitle, body, image_reference, published_date)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, author_id, title, subtitle, body, image_reference, published_date
            ",
        )
        .bind(author_id.as_i64())
        .bind(&draft.title)
        .bind(&draft.subtitle)
        .bind(&draft.body)
        .bind(&draft.image_reference)
        .bind(published_date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "title already exists"))?;

        Ok(row.into())
    }

    /// Overwrite the editable fields of a post.
    ///
    /// `author_id` and `published_date` are never touched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new title belongs to another post.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: PostId, draft: &PostDraft) -> Result<Post, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r"
            UPDATE posts
            SET title = ?, subtitle = ?, body = ?, image_reference = ?
            WHERE id = ?
            RETURNING id, author_id, title, subtitle, body, image_reference, published_date
            ",
        )
        .bind(&draft.title)
        .bind(&draft.subtitle)
        .bind(&draft.body)
        .bind(&draft.image_reference)
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "title already exists"))?;

        row.map(Post::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a post and all of its comments in one transaction.
    ///
    /// # Returns
    ///
    /// Returns the number of comments removed alongside the post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist (nothing is removed).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: PostId) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // The foreign key cascades too; deleting explicitly keeps the
        // guarantee even on connections opened without foreign key enforcement.
        let comments = sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        let post = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if post.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(comments.rows_affected())
    }

    /// Count posts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

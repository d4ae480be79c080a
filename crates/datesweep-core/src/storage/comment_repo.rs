use chrono::NaiveDateTime;
use sqlx::FromRow;

use super::Database;
use crate::content::{Comment, CommentStatus, DateRange, NewComment, DATETIME_FORMAT};
use crate::{Error, Result};

/// Repository for comment storage
pub struct CommentRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    parent_id: Option<i64>,
    author: String,
    author_email: String,
    content: String,
    status: String,
    created_at: NaiveDateTime,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            parent_id: row.parent_id,
            author: row.author,
            author_email: row.author_email,
            content: row.content,
            status: CommentStatus::parse(&row.status).unwrap_or(CommentStatus::Pending),
            created_at: row.created_at,
        }
    }
}

impl<'a> CommentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a comment
    pub async fn create(&self, new_comment: &NewComment) -> Result<Comment> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, parent_id, author, author_email, content, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_comment.post_id)
        .bind(new_comment.parent_id)
        .bind(&new_comment.author)
        .bind(&new_comment.author_email)
        .bind(&new_comment.content)
        .bind(new_comment.status.as_str())
        .bind(new_comment.created_at.format(DATETIME_FORMAT).to_string())
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(Error::CommentNotFound(id))
    }

    /// Find a comment by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, post_id, parent_id, author, author_email, content, status, created_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(Comment::from))
    }

    /// IDs of comments of any status dated within the range, newest first
    pub async fn ids_in_range(&self, range: &DateRange) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM comments
            WHERE created_at BETWEEN ? AND ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(range.lower_bound())
        .bind(range.upper_bound())
        .fetch_all(self.db.pool())
        .await?;

        Ok(ids)
    }

    /// Delete a comment outright, bypassing the trash status.
    ///
    /// Replies are re-attached to the deleted comment's parent. Returns
    /// `false` when no such comment exists.
    pub async fn delete_permanently(&self, id: i64) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let parent: Option<Option<i64>> =
            sqlx::query_scalar("SELECT parent_id FROM comments WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(parent_id) = parent else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE comments SET parent_id = ? WHERE parent_id = ?")
            .bind(parent_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all stored comments
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

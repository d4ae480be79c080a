use chrono::NaiveDateTime;
use sqlx::FromRow;

use super::Database;
use crate::content::{Attachment, DateRange, NewAttachment, DATETIME_FORMAT};
use crate::{Error, Result};

/// Repository for media attachment records
pub struct AttachmentRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct AttachmentRow {
    id: i64,
    title: String,
    file_name: String,
    mime_type: String,
    uploader_id: Option<i64>,
    created_at: NaiveDateTime,
    uploader_name: Option<String>,
}

impl From<AttachmentRow> for Attachment {
    fn from(row: AttachmentRow) -> Self {
        Attachment {
            id: row.id,
            title: row.title,
            file_name: row.file_name,
            mime_type: row.mime_type,
            uploader_id: row.uploader_id,
            created_at: row.created_at,
        }
    }
}

impl<'a> AttachmentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert an attachment record
    pub async fn create(&self, new_attachment: &NewAttachment) -> Result<Attachment> {
        let result = sqlx::query(
            r#"
            INSERT INTO attachments (title, file_name, mime_type, uploader_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_attachment.title)
        .bind(&new_attachment.file_name)
        .bind(&new_attachment.mime_type)
        .bind(new_attachment.uploader_id)
        .bind(new_attachment.created_at.format(DATETIME_FORMAT).to_string())
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(Error::AttachmentNotFound(id))
    }

    /// Find an attachment by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Attachment>> {
        Ok(self.find_with_uploader(id).await?.map(|(attachment, _)| attachment))
    }

    /// Find an attachment together with its uploader's display name
    pub async fn find_with_uploader(&self, id: i64) -> Result<Option<(Attachment, Option<String>)>> {
        let row: Option<AttachmentRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.title, a.file_name, a.mime_type, a.uploader_id, a.created_at,
                   u.display_name AS uploader_name
            FROM attachments a
            LEFT JOIN users u ON u.id = a.uploader_id
            WHERE a.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|mut row| {
            let uploader = row.uploader_name.take();
            (Attachment::from(row), uploader)
        }))
    }

    /// IDs of attachments dated within the range, newest first
    pub async fn ids_in_range(&self, range: &DateRange) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM attachments
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

    /// Remove an attachment record. Returns `false` when it did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all stored attachments
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attachments")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

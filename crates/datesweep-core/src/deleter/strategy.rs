use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use super::LogRow;
use crate::content::{trim_words, Attachment, DateRange};
use crate::storage::{AttachmentRepository, CommentRepository, Database};
use crate::{Error, Result};

/// The kinds of record that can be bulk deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Comments,
    Attachments,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Comments, ContentType::Attachments];

    /// Form value identifying this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comments => "comments",
            Self::Attachments => "attachments",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "comments" => Some(Self::Comments),
            "attachments" => Some(Self::Attachments),
            _ => None,
        }
    }

    /// Label shown in the type selector
    pub fn menu_label(&self) -> &'static str {
        match self {
            Self::Comments => "Comments",
            Self::Attachments => "Attachments (Media)",
        }
    }

    pub fn log_headers(&self) -> &'static [&'static str] {
        match self {
            Self::Comments => &["Author", "Email", "Date", "Comment Excerpt"],
            Self::Attachments => &["Preview", "File Name", "Uploaded By", "Date"],
        }
    }

    pub fn label_singular(&self) -> &'static str {
        match self {
            Self::Comments => "comment",
            Self::Attachments => "attachment",
        }
    }

    pub fn label_plural(&self) -> &'static str {
        match self {
            Self::Comments => "comments",
            Self::Attachments => "attachments",
        }
    }

    /// `singular` when `count` is exactly one
    pub fn label_for(&self, count: usize) -> &'static str {
        if count == 1 {
            self.label_singular()
        } else {
            self.label_plural()
        }
    }
}

/// Per-type record access used by the deleter
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// IDs of records dated within the range, in the order they will be processed
    async fn query_ids(&self, range: &DateRange) -> Result<Vec<i64>>;

    /// Display values for one record, read before it is deleted
    async fn log_row(&self, id: i64) -> Result<LogRow>;

    /// Remove a record for good. `Ok(false)` means the removal did not happen.
    async fn delete_permanently(&self, id: i64) -> Result<bool>;
}

/// Comments backed by SQLite
pub struct CommentStore {
    db: Database,
    excerpt_words: usize,
}

impl CommentStore {
    pub fn new(db: Database, excerpt_words: usize) -> Self {
        Self { db, excerpt_words }
    }
}

#[async_trait]
impl ContentStore for CommentStore {
    async fn query_ids(&self, range: &DateRange) -> Result<Vec<i64>> {
        CommentRepository::new(&self.db).ids_in_range(range).await
    }

    async fn log_row(&self, id: i64) -> Result<LogRow> {
        let comment = CommentRepository::new(&self.db)
            .find_by_id(id)
            .await?
            .ok_or(Error::CommentNotFound(id))?;

        Ok(LogRow::new(vec![
            html_escape::encode_text(&comment.author).into_owned(),
            comment.author_email.clone(),
            comment.date_string(),
            trim_words(&comment.content, self.excerpt_words),
        ]))
    }

    async fn delete_permanently(&self, id: i64) -> Result<bool> {
        CommentRepository::new(&self.db).delete_permanently(id).await
    }
}

/// Attachments backed by SQLite plus files in the uploads directory
pub struct AttachmentStore {
    db: Database,
    uploads_dir: PathBuf,
    date_format: String,
}

impl AttachmentStore {
    pub fn new(db: Database, uploads_dir: PathBuf, date_format: impl Into<String>) -> Self {
        Self {
            db,
            uploads_dir,
            date_format: date_format.into(),
        }
    }
}

/// Preview markup for the first log column
pub fn thumbnail_html(attachment: &Attachment) -> String {
    if attachment.is_image() {
        format!(
            r#"<img src="/uploads/{}" class="bdd-log-thumb" width="60" height="60" alt="" loading="lazy">"#,
            html_escape::encode_double_quoted_attribute(&attachment.file_name)
        )
    } else {
        r#"<span class="bdd-log-thumb bdd-file-icon" aria-hidden="true">&#128196;</span>"#
            .to_string()
    }
}

#[async_trait]
impl ContentStore for AttachmentStore {
    async fn query_ids(&self, range: &DateRange) -> Result<Vec<i64>> {
        AttachmentRepository::new(&self.db).ids_in_range(range).await
    }

    async fn log_row(&self, id: i64) -> Result<LogRow> {
        let (attachment, uploader) = AttachmentRepository::new(&self.db)
            .find_with_uploader(id)
            .await?
            .ok_or(Error::AttachmentNotFound(id))?;

        Ok(LogRow::new(vec![
            thumbnail_html(&attachment),
            attachment.title.clone(),
            uploader.unwrap_or_default(),
            attachment.created_at.format(&self.date_format).to_string(),
        ]))
    }

    async fn delete_permanently(&self, id: i64) -> Result<bool> {
        let repo = AttachmentRepository::new(&self.db);
        let Some(attachment) = repo.find_by_id(id).await? else {
            return Ok(false);
        };

        if !repo.delete(id).await? {
            return Ok(false);
        }

        if attachment.file_name.is_empty() {
            return Ok(true);
        }

        let path = self.uploads_dir.join(&attachment.file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => {
                warn!("Removed attachment {} but could not delete {}: {}", id, path.display(), e);
                Ok(false)
            }
        }
    }
}

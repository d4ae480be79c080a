use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::security::Capability;

/// Timestamp layout used for record dates
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Site roles, from most to least privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Editor,
    Author,
    Subscriber,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Editor => "editor",
            Self::Author => "author",
            Self::Subscriber => "subscriber",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "administrator" => Some(Self::Administrator),
            "editor" => Some(Self::Editor),
            "author" => Some(Self::Author),
            "subscriber" => Some(Self::Subscriber),
            _ => None,
        }
    }

    /// Whether this role grants the given capability
    pub fn has_cap(&self, cap: Capability) -> bool {
        match cap {
            Capability::ManageOptions => matches!(self, Self::Administrator),
            Capability::ModerateComments => matches!(self, Self::Administrator | Self::Editor),
            Capability::UploadFiles => !matches!(self, Self::Subscriber),
            Capability::Read => true,
        }
    }
}

/// A site user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

/// Moderation status of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Approved,
    Pending,
    Spam,
    Trash,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Spam => "spam",
            Self::Trash => "trash",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(Self::Approved),
            "pending" => Some(Self::Pending),
            "spam" => Some(Self::Spam),
            "trash" => Some(Self::Trash),
            _ => None,
        }
    }
}

/// A comment left on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub author_email: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: NaiveDateTime,
}

/// Data required to create a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub author_email: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: NaiveDateTime,
}

/// A media attachment; the file lives in the uploads directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub uploader_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

/// Data required to create a new attachment
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub uploader_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl Comment {
    /// Raw record date as stored
    pub fn date_string(&self) -> String {
        self.created_at.format(DATETIME_FORMAT).to_string()
    }
}

impl Attachment {
    /// Check if the attachment can be previewed as an image
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Reduce a file name to a safe single path component.
///
/// Whitespace becomes `-`; anything outside `[A-Za-z0-9._-]` is dropped.
pub fn sanitize_file_name(name: &str) -> String {
    let base = std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '-').to_string()
}

/// Guess a mime type from the file extension
pub fn mime_from_file_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

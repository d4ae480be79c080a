use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use datesweep_core::{
    content::{
        mime_from_file_name, sanitize_file_name, CommentStatus, NewAttachment, NewComment,
        DATETIME_FORMAT,
    },
    storage::{AttachmentRepository, CommentRepository, Database, UserRepository},
    AppConfig,
};

pub struct CommentArgs {
    pub date: String,
    pub author: String,
    pub email: String,
    pub content: String,
    pub post_id: i64,
    pub parent: Option<i64>,
    pub status: String,
}

/// Accept a full timestamp or a bare date (midnight)
fn parse_moment(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(moment) = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT) {
        return Ok(moment);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| anyhow!("invalid date '{}', expected YYYY-MM-DD [HH:MM:SS]", value))
}

pub async fn comment(config: &AppConfig, args: CommentArgs) -> Result<()> {
    let status = CommentStatus::parse(&args.status)
        .ok_or_else(|| anyhow!("unknown comment status '{}'", args.status))?;

    let db = Database::new(config).await?;
    let comment = CommentRepository::new(&db)
        .create(&NewComment {
            post_id: args.post_id,
            parent_id: args.parent,
            author: args.author,
            author_email: args.email,
            content: args.content,
            status,
            created_at: parse_moment(&args.date)?,
        })
        .await?;

    println!("Added comment {} dated {}", comment.id, comment.date_string());
    Ok(())
}

pub async fn attachment(
    config: &AppConfig,
    file: &Path,
    date: &str,
    title: Option<String>,
    uploader: Option<&str>,
) -> Result<()> {
    let created_at = parse_moment(date)?;

    let original = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", file.display()))?;
    let file_name = sanitize_file_name(original);
    if file_name.is_empty() {
        bail!("{} has no usable file name", file.display());
    }

    let db = Database::new(config).await?;

    let uploader_id = match uploader {
        Some(login) => Some(
            UserRepository::new(&db)
                .find_by_login(login)
                .await?
                .ok_or_else(|| anyhow!("no user named '{}'", login))?
                .id,
        ),
        None => None,
    };

    let uploads = config.uploads_dir();
    tokio::fs::create_dir_all(&uploads).await?;
    let target = uploads.join(&file_name);
    if target.exists() {
        bail!("{} already exists in the uploads directory", file_name);
    }
    tokio::fs::copy(file, &target)
        .await
        .with_context(|| format!("copying {} to {}", file.display(), target.display()))?;

    let title = title.unwrap_or_else(|| {
        file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| file_name.clone())
    });

    let attachment = AttachmentRepository::new(&db)
        .create(&NewAttachment {
            title,
            mime_type: mime_from_file_name(&file_name).to_string(),
            file_name,
            uploader_id,
            created_at,
        })
        .await?;

    println!(
        "Added attachment {} ({}, {})",
        attachment.id, attachment.file_name, attachment.mime_type
    );
    Ok(())
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ContentType, DeleteError};
use crate::content::DateRange;

/// Date layout accepted from the form
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw fields posted by the admin page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub delete_type: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// A validated deletion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionRequest {
    pub content_type: ContentType,
    pub range: DateRange,
}

impl DeleteForm {
    /// Check dates, their order and the content type, in that order
    pub fn validate(&self) -> Result<DeletionRequest, DeleteError> {
        let start = parse_date(self.start_date.trim());
        let end = parse_date(self.end_date.trim());

        let (Some(start), Some(end)) = (start, end) else {
            return Err(DeleteError::InvalidDateFormat);
        };

        let range = DateRange::new(start, end);
        if range.is_inverted() {
            return Err(DeleteError::InvertedRange);
        }

        let content_type = ContentType::from_key(&sanitize_key(&self.delete_type))
            .ok_or(DeleteError::InvalidContentType)?;

        Ok(DeletionRequest {
            content_type,
            range,
        })
    }
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// The value must be a real calendar day and must format back to exactly the
/// same text, so `2024-1-5` and `2024-02-30` are rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == value).then_some(date)
}

/// Lowercase and keep only `[a-z0-9_-]`
pub fn sanitize_key(value: &str) -> String {
    value
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

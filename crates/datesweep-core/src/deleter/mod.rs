//! Bulk deletion of comments or attachments within a date range

mod error;
mod request;
mod result;
mod service;
mod strategy;

pub use error::DeleteError;
pub use request::{parse_date, sanitize_key, DeleteForm, DeletionRequest, DATE_FORMAT};
pub use result::{AjaxResponse, DeletionResult, ErrorData, LogRow};
pub use service::BulkDeleter;
pub use strategy::{thumbnail_html, AttachmentStore, CommentStore, ContentStore, ContentType};

/// Action the anti-forgery token is bound to
pub const NONCE_ACTION: &str = "bdd_delete_nonce_action";

/// Value of the `action` field routed to the deleter
pub const AJAX_ACTION: &str = "bdd_delete_items";

/// Slug of the admin page
pub const MENU_SLUG: &str = "bulk-deleter-by-date";

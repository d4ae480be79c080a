use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::{
    AttachmentStore, CommentStore, ContentStore, ContentType, DeleteError, DeleteForm,
    DeletionRequest, DeletionResult, LogRow, NONCE_ACTION,
};
use crate::config::AppConfig;
use crate::security::{Actor, Capability, NonceAge, NonceIssuer};
use crate::storage::Database;

/// Validates bulk delete requests and runs them against the matching store.
///
/// Built once at startup and shared between requests.
pub struct BulkDeleter {
    nonces: NonceIssuer,
    comments: Arc<dyn ContentStore>,
    attachments: Arc<dyn ContentStore>,
}

impl BulkDeleter {
    pub fn new(
        nonces: NonceIssuer,
        comments: Arc<dyn ContentStore>,
        attachments: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            nonces,
            comments,
            attachments,
        }
    }

    /// Wire up the SQLite-backed stores
    pub fn from_database(db: &Database, config: &AppConfig) -> Self {
        let nonces = NonceIssuer::new(
            config.security.secret.as_bytes().to_vec(),
            config.security.nonce_lifetime_secs,
        );
        let comments = CommentStore::new(db.clone(), config.display.excerpt_words);
        let attachments = AttachmentStore::new(
            db.clone(),
            config.uploads_dir(),
            config.display.date_format.clone(),
        );

        Self::new(nonces, Arc::new(comments), Arc::new(attachments))
    }

    /// Token embedded in the admin page for `actor`
    pub fn issue_nonce(&self, actor: &Actor) -> String {
        self.nonces.issue(NONCE_ACTION, actor)
    }

    fn store(&self, content_type: ContentType) -> &dyn ContentStore {
        match content_type {
            ContentType::Comments => self.comments.as_ref(),
            ContentType::Attachments => self.attachments.as_ref(),
        }
    }

    /// Check the token, the caller's capability and the form, then delete
    pub async fn handle(
        &self,
        actor: &Actor,
        form: &DeleteForm,
    ) -> Result<DeletionResult, DeleteError> {
        let nonce = form.nonce.as_deref().unwrap_or_default();
        match self.nonces.verify(nonce, NONCE_ACTION, actor) {
            Some(NonceAge::Fresh) => {}
            Some(NonceAge::Aging) => debug!("Accepted token from the previous tick"),
            None => return Err(DeleteError::AuthenticationFailure),
        }

        if !actor.can(Capability::ManageOptions) {
            return Err(DeleteError::AuthorizationFailure);
        }

        let request = form.validate()?;

        let span = info_span!("bulk_delete", run = %Uuid::new_v4(), user_id = actor.user_id);
        async {
            info!(
                "Bulk delete of {} from {} to {}",
                request.content_type.as_str(),
                request.range.start,
                request.range.end
            );
            self.execute(&request).await
        }
        .instrument(span)
        .await
    }

    /// Delete every record matched by an already validated request
    pub async fn execute(&self, request: &DeletionRequest) -> Result<DeletionResult, DeleteError> {
        let content_type = request.content_type;
        let store = self.store(content_type);
        let log_headers: Vec<String> = content_type
            .log_headers()
            .iter()
            .map(|h| h.to_string())
            .collect();

        let ids = store
            .query_ids(&request.range)
            .await
            .map_err(DeleteError::Store)?;

        if ids.is_empty() {
            return Ok(DeletionResult {
                message: format!(
                    "No {} were found in the specified date range.",
                    content_type.label_plural()
                ),
                deleted_items: Vec::new(),
                log_headers,
                deleted_count: 0,
            });
        }

        let mut deleted_items = Vec::with_capacity(ids.len());
        let mut deleted_count = 0usize;

        for id in ids {
            let row = match store.log_row(id).await {
                Ok(row) => row,
                Err(e) => {
                    warn!("Could not read {} {} for the log: {}", content_type.label_singular(), id, e);
                    LogRow::unavailable(log_headers.len())
                }
            };
            deleted_items.push(row);

            match store.delete_permanently(id).await {
                Ok(true) => {
                    debug!("Deleted {} {}", content_type.label_singular(), id);
                    deleted_count += 1;
                }
                Ok(false) => warn!("Failed to delete {} {}", content_type.label_singular(), id),
                Err(e) => warn!("Failed to delete {} {}: {}", content_type.label_singular(), id, e),
            }
        }

        info!(
            "Deleted {} of {} matched {}",
            deleted_count,
            deleted_items.len(),
            content_type.label_plural()
        );

        Ok(DeletionResult {
            message: format!(
                "Successfully deleted {} {}.",
                deleted_count,
                content_type.label_for(deleted_count)
            ),
            deleted_items,
            log_headers,
            deleted_count,
        })
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::deleter::{AjaxResponse, DeleteError};

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self {
            DeleteError::Store(e) => error!("Bulk delete failed: {}", e),
            DeleteError::AuthenticationFailure | DeleteError::AuthorizationFailure => {
                warn!("Rejected bulk delete request: {}", self)
            }
            _ => {}
        }

        (status, Json(AjaxResponse::error(self.to_string()))).into_response()
    }
}

/// JSON failure outside the deleter's own taxonomy
pub fn ajax_error(status: StatusCode, message: &str) -> Response {
    (status, Json(AjaxResponse::error(message))).into_response()
}

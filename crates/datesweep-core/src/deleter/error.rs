use thiserror::Error;

/// Why a bulk delete request was refused.
///
/// Every variant is terminal for the request. All of them except `Store`
/// are detected before any record is touched.
#[derive(Error, Debug)]
pub enum DeleteError {
    /// Missing or invalid anti-forgery token
    #[error("Security check failed.")]
    AuthenticationFailure,

    /// Caller lacks the administrative capability
    #[error("You do not have permission to perform this action.")]
    AuthorizationFailure,

    #[error("Invalid date format. Please use YYYY-MM-DD.")]
    InvalidDateFormat,

    #[error("Start date cannot be after end date.")]
    InvertedRange,

    #[error("Invalid content type selected.")]
    InvalidContentType,

    /// The matching records could not be looked up
    #[error("An unexpected error occurred.")]
    Store(#[source] crate::Error),
}

impl DeleteError {
    /// HTTP status reported with the failure
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AuthenticationFailure | Self::AuthorizationFailure => 403,
            Self::InvalidDateFormat | Self::InvertedRange | Self::InvalidContentType => 400,
            Self::Store(_) => 500,
        }
    }

    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateFormat | Self::InvertedRange | Self::InvalidContentType
        )
    }
}

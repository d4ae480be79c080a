use serde::{Deserialize, Serialize};

/// One line of the deletion log.
///
/// The first cell may hold markup (a thumbnail); the others are plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogRow(Vec<String>);

impl LogRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    /// Row used when a record's details could not be read
    pub fn unavailable(arity: usize) -> Self {
        Self(vec![String::new(); arity])
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of a successful request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionResult {
    pub message: String,
    pub deleted_items: Vec<LogRow>,
    pub log_headers: Vec<String>,
    /// Records actually removed; at most `deleted_items.len()`
    #[serde(skip)]
    pub deleted_count: usize,
}

/// Failure payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub message: String,
}

/// `{"success": bool, "data": ...}` envelope returned to the admin page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxResponse<T> {
    pub success: bool,
    pub data: T,
}

impl AjaxResponse<DeletionResult> {
    pub fn success(result: DeletionResult) -> Self {
        Self {
            success: true,
            data: result,
        }
    }
}

impl AjaxResponse<ErrorData> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: ErrorData {
                message: message.into(),
            },
        }
    }
}

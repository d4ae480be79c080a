//! Client behaviour of the admin page as an explicit state machine
//!
//! `admin.js` follows the same transitions; this model is what the page
//! script is checked against.

use serde::Deserialize;

use crate::deleter::{ContentType, DeleteForm, LogRow, AJAX_ACTION};

pub const MISSING_FIELDS_MESSAGE: &str = "Please select a content type, start date, and end date.";
pub const NETWORK_ERROR_MESSAGE: &str = "An unexpected error occurred.";
pub const PROCESSING_MESSAGE: &str = "Processing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    /// Form visible, no type chosen
    Idle,
    /// Date pickers visible
    TypeSelected,
    /// Form hidden behind a Yes/No prompt
    Confirming,
    /// Request in flight, prompt controls disabled
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFields {
    pub delete_type: String,
    pub start_date: String,
    pub end_date: String,
}

impl FormFields {
    fn is_complete(&self) -> bool {
        !self.delete_type.is_empty() && !self.start_date.is_empty() && !self.end_date.is_empty()
    }
}

/// Body of a reply from the delete endpoint, success or failure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplyData {
    pub message: String,
    #[serde(default)]
    pub deleted_items: Vec<LogRow>,
    #[serde(default)]
    pub log_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerReply {
    pub success: bool,
    pub data: ReplyData,
}

/// How a submitted request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(ServerReply),
    NetworkError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectType(String),
    SetStartDate(String),
    SetEndDate(String),
    Submit,
    Cancel,
    Confirm,
    Completed(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "notice-success",
            Self::Error => "notice-error",
        }
    }
}

/// Changes the page makes in response to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowDatePickers,
    HideDatePickers,
    ClearNotices,
    ShowNotice { level: NoticeLevel, message: String },
    ShowConfirmation { prompt: String },
    HideConfirmation,
    HideSubmit,
    ShowSubmit,
    DisableConfirmControls,
    HideLog,
    ShowProcessing,
    SendRequest(DeleteForm),
    RenderLog { headers: Vec<String>, rows: Vec<LogRow> },
    ClearLog,
    /// Empty the type selector and both date pickers
    ResetForm,
}

/// The admin page's client state
#[derive(Debug, Clone)]
pub struct AdminUi {
    state: UiState,
    fields: FormFields,
    nonce: String,
}

impl AdminUi {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self {
            state: UiState::Idle,
            fields: FormFields::default(),
            nonce: nonce.into(),
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Apply an event. Events that make no sense in the current state are ignored.
    pub fn apply(&mut self, event: UiEvent) -> Vec<Effect> {
        match (self.state, event) {
            (UiState::Idle | UiState::TypeSelected, UiEvent::SelectType(value)) => {
                self.fields.delete_type = value;
                if self.fields.delete_type.is_empty() {
                    self.state = UiState::Idle;
                    vec![Effect::HideDatePickers]
                } else {
                    self.state = UiState::TypeSelected;
                    vec![Effect::ShowDatePickers]
                }
            }
            (UiState::Idle | UiState::TypeSelected, UiEvent::SetStartDate(value)) => {
                self.fields.start_date = value;
                Vec::new()
            }
            (UiState::Idle | UiState::TypeSelected, UiEvent::SetEndDate(value)) => {
                self.fields.end_date = value;
                Vec::new()
            }
            (UiState::Idle | UiState::TypeSelected, UiEvent::Submit) => {
                if !self.fields.is_complete() {
                    return vec![
                        Effect::ClearNotices,
                        Effect::ShowNotice {
                            level: NoticeLevel::Error,
                            message: MISSING_FIELDS_MESSAGE.to_string(),
                        },
                    ];
                }
                self.state = UiState::Confirming;
                vec![
                    Effect::ClearNotices,
                    Effect::ShowConfirmation {
                        prompt: confirmation_prompt(&self.fields.delete_type),
                    },
                    Effect::HideSubmit,
                ]
            }
            (UiState::Confirming, UiEvent::Cancel) => {
                self.reset();
                vec![Effect::HideConfirmation, Effect::ShowSubmit, Effect::ResetForm, Effect::HideDatePickers]
            }
            (UiState::Confirming, UiEvent::Confirm) => {
                self.state = UiState::Submitting;
                vec![
                    Effect::DisableConfirmControls,
                    Effect::ClearNotices,
                    Effect::HideLog,
                    Effect::ShowProcessing,
                    Effect::SendRequest(self.request()),
                ]
            }
            (UiState::Submitting, UiEvent::Completed(outcome)) => {
                let mut effects = completion_effects(outcome);
                self.reset();
                effects.extend([Effect::HideConfirmation, Effect::ShowSubmit, Effect::ResetForm, Effect::HideDatePickers]);
                effects
            }
            _ => Vec::new(),
        }
    }

    fn request(&self) -> DeleteForm {
        DeleteForm {
            action: AJAX_ACTION.to_string(),
            nonce: Some(self.nonce.clone()),
            delete_type: self.fields.delete_type.clone(),
            start_date: self.fields.start_date.clone(),
            end_date: self.fields.end_date.clone(),
        }
    }

    fn reset(&mut self) {
        self.state = UiState::Idle;
        self.fields = FormFields::default();
    }
}

/// Prompt shown before deleting; unescaped
pub fn confirmation_prompt(delete_type: &str) -> String {
    let label = ContentType::from_key(delete_type)
        .map(|t| t.menu_label())
        .unwrap_or(delete_type);
    format!("Are you sure you want to permanently delete all {label} in the selected range?")
}

fn completion_effects(outcome: Outcome) -> Vec<Effect> {
    match outcome {
        Outcome::Reply(reply) => {
            let level = if reply.success {
                NoticeLevel::Success
            } else {
                NoticeLevel::Error
            };
            let log = if reply.success && !reply.data.deleted_items.is_empty() {
                Effect::RenderLog {
                    headers: reply.data.log_headers,
                    rows: reply.data.deleted_items,
                }
            } else {
                Effect::ClearLog
            };
            vec![
                Effect::ShowNotice {
                    level,
                    message: reply.data.message,
                },
                log,
            ]
        }
        Outcome::NetworkError => vec![Effect::ShowNotice {
            level: NoticeLevel::Error,
            message: NETWORK_ERROR_MESSAGE.to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(ui: &mut AdminUi) {
        ui.apply(UiEvent::SelectType("comments".to_string()));
        ui.apply(UiEvent::SetStartDate("2024-01-01".to_string()));
        ui.apply(UiEvent::SetEndDate("2024-01-31".to_string()));
    }

    #[test]
    fn test_selecting_type_toggles_date_pickers() {
        let mut ui = AdminUi::new("abc");
        assert_eq!(ui.apply(UiEvent::SelectType("attachments".to_string())), vec![Effect::ShowDatePickers]);
        assert_eq!(ui.state(), UiState::TypeSelected);

        assert_eq!(ui.apply(UiEvent::SelectType(String::new())), vec![Effect::HideDatePickers]);
        assert_eq!(ui.state(), UiState::Idle);
    }

    #[test]
    fn test_submit_requires_all_fields() {
        let mut ui = AdminUi::new("abc");
        ui.apply(UiEvent::SelectType("comments".to_string()));
        ui.apply(UiEvent::SetStartDate("2024-01-01".to_string()));

        let effects = ui.apply(UiEvent::Submit);
        assert!(effects.contains(&Effect::ShowNotice {
            level: NoticeLevel::Error,
            message: MISSING_FIELDS_MESSAGE.to_string(),
        }));
        assert_eq!(ui.state(), UiState::TypeSelected);
    }

    #[test]
    fn test_submit_does_not_check_ordering() {
        let mut ui = AdminUi::new("abc");
        ui.apply(UiEvent::SelectType("comments".to_string()));
        ui.apply(UiEvent::SetStartDate("2024-02-01".to_string()));
        ui.apply(UiEvent::SetEndDate("2024-01-01".to_string()));

        ui.apply(UiEvent::Submit);
        assert_eq!(ui.state(), UiState::Confirming);
    }

    #[test]
    fn test_confirmation_prompt_uses_menu_label() {
        let mut ui = AdminUi::new("abc");
        filled(&mut ui);
        ui.apply(UiEvent::SelectType("attachments".to_string()));

        let effects = ui.apply(UiEvent::Submit);
        assert_eq!(
            effects[1],
            Effect::ShowConfirmation {
                prompt: "Are you sure you want to permanently delete all Attachments (Media) in the selected range?".to_string()
            }
        );
        assert_eq!(ui.state(), UiState::Confirming);
    }

    #[test]
    fn test_cancel_resets_everything() {
        let mut ui = AdminUi::new("abc");
        filled(&mut ui);
        ui.apply(UiEvent::Submit);

        let effects = ui.apply(UiEvent::Cancel);
        assert!(effects.contains(&Effect::ResetForm));
        assert_eq!(ui.state(), UiState::Idle);
        assert_eq!(ui.fields(), &FormFields::default());
    }

    #[test]
    fn test_confirm_sends_request() {
        let mut ui = AdminUi::new("nonce-123");
        filled(&mut ui);
        ui.apply(UiEvent::Submit);

        let effects = ui.apply(UiEvent::Confirm);
        assert_eq!(ui.state(), UiState::Submitting);
        assert_eq!(
            effects.last(),
            Some(&Effect::SendRequest(DeleteForm {
                action: "bdd_delete_items".to_string(),
                nonce: Some("nonce-123".to_string()),
                delete_type: "comments".to_string(),
                start_date: "2024-01-01".to_string(),
                end_date: "2024-01-31".to_string(),
            }))
        );

        // Nothing else is accepted while the request is in flight
        assert!(ui.apply(UiEvent::Cancel).is_empty());
        assert!(ui.apply(UiEvent::Submit).is_empty());
        assert_eq!(ui.state(), UiState::Submitting);
    }

    #[test]
    fn test_success_with_rows_renders_log() {
        let mut ui = AdminUi::new("abc");
        filled(&mut ui);
        ui.apply(UiEvent::Submit);
        ui.apply(UiEvent::Confirm);

        let reply: ServerReply = serde_json::from_str(
            r#"{"success":true,"data":{"message":"Successfully deleted 1 comment.","deleted_items":[["Jane","j@x.io","2024-01-05 00:00:00","hi"]],"log_headers":["Author","Email","Date","Comment Excerpt"]}}"#,
        )
        .unwrap();

        let effects = ui.apply(UiEvent::Completed(Outcome::Reply(reply)));
        assert_eq!(
            effects[0],
            Effect::ShowNotice {
                level: NoticeLevel::Success,
                message: "Successfully deleted 1 comment.".to_string()
            }
        );
        assert!(matches!(&effects[1], Effect::RenderLog { rows, .. } if rows.len() == 1));
        assert!(effects.contains(&Effect::ResetForm));
        assert_eq!(ui.state(), UiState::Idle);
    }

    #[test]
    fn test_failure_reply_and_network_error() {
        let mut ui = AdminUi::new("abc");
        filled(&mut ui);
        ui.apply(UiEvent::Submit);
        ui.apply(UiEvent::Confirm);

        let reply: ServerReply =
            serde_json::from_str(r#"{"success":false,"data":{"message":"Security check failed."}}"#).unwrap();
        let effects = ui.apply(UiEvent::Completed(Outcome::Reply(reply)));
        assert_eq!(effects[1], Effect::ClearLog);
        assert_eq!(ui.state(), UiState::Idle);

        filled(&mut ui);
        ui.apply(UiEvent::Submit);
        ui.apply(UiEvent::Confirm);
        let effects = ui.apply(UiEvent::Completed(Outcome::NetworkError));
        assert_eq!(
            effects[0],
            Effect::ShowNotice {
                level: NoticeLevel::Error,
                message: NETWORK_ERROR_MESSAGE.to_string()
            }
        );
        assert_eq!(ui.state(), UiState::Idle);
        assert_eq!(ui.fields(), &FormFields::default());
    }
}

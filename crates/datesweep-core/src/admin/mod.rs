//! Admin page markup and its client-side behaviour

mod page;
pub mod ui;

pub use page::{render_admin_page, render_login_page, render_notice, AdminPageContext};
pub use ui::{AdminUi, Effect, NoticeLevel, Outcome, ServerReply, UiEvent, UiState};

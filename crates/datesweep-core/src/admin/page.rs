//! Server-rendered markup for the admin and login pages

use html_escape::encode_text;
use serde::Serialize;

use super::ui::NoticeLevel;
use crate::deleter::{ContentType, AJAX_ACTION};

const ADMIN_CSS: &str = include_str!("assets/admin.css");
const ADMIN_JS: &str = include_str!("assets/admin.js");

/// Values the admin page needs from the current request
pub struct AdminPageContext<'a> {
    pub display_name: &'a str,
    pub nonce: &'a str,
    pub ajax_url: &'a str,
}

/// Settings handed to `admin.js`
#[derive(Serialize)]
struct ClientSettings<'a> {
    ajax_url: &'a str,
    action: &'a str,
    nonce: &'a str,
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = encode_text(title),
        css = ADMIN_CSS,
    )
}

/// JSON that is safe to place inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> crate::Result<String> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

/// The bulk deleter tool page
pub fn render_admin_page(ctx: &AdminPageContext<'_>) -> crate::Result<String> {
    let settings = script_json(&ClientSettings {
        ajax_url: ctx.ajax_url,
        action: AJAX_ACTION,
        nonce: ctx.nonce,
    })?;

    let options: String = ContentType::ALL
        .iter()
        .map(|t| {
            format!(
                r#"<option value="{}">{}</option>"#,
                t.as_str(),
                encode_text(t.menu_label())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"<header class="bdd-bar">
<span>Signed in as <strong>{name}</strong></span>
<form method="post" action="/admin/logout"><button type="submit" class="button button-link">Log out</button></form>
</header>
<div class="wrap">
<h1>Bulk Deleter by Date Range</h1>
<div id="bdd-notices-wrapper"></div>
<p>Select a content type, a start date, and an end date to permanently delete all items within that range (inclusive).</p>
<p><strong>Warning: This action is irreversible and will bypass the trash.</strong></p>
<form id="bdd-form" class="bdd-form">
<p>
<label for="bdd-delete-type" class="bdd-label"><strong>Select Content Type</strong></label>
<select name="delete_type" id="bdd-delete-type">
<option value="">-- Select Type --</option>
{options}
</select>
</p>
<div id="bdd-date-picker-wrapper" hidden>
<p class="bdd-range-title"><strong>Select Date Range</strong></p>
<div class="bdd-flex-container">
<div class="bdd-date-field-wrapper" id="bdd-start-date-container">
<label for="bdd-start-date">Start Date</label>
<input type="date" id="bdd-start-date" name="start_date">
</div>
<div class="bdd-date-field-wrapper" id="bdd-end-date-container">
<label for="bdd-end-date">End Date</label>
<input type="date" id="bdd-end-date" name="end_date">
</div>
</div>
</div>
<p class="submit"><button type="submit" id="bdd-submit-button" class="button button-primary">Delete Items</button></p>
</form>
<div id="bdd-confirmation-area" class="notice notice-warning inline" hidden></div>
<div id="bdd-log-container" hidden>
<button type="button" class="notice-dismiss bdd-dismiss-log"><span class="screen-reader-text">Dismiss this notice.</span></button>
<h2>Deletion Log</h2>
<div id="bdd-log-results"></div>
</div>
</div>
<script id="bdd-settings" type="application/json">{settings}</script>
<script>{js}</script>"#,
        name = encode_text(ctx.display_name),
        js = ADMIN_JS,
    );

    Ok(layout("Bulk Deleter by Date", &body))
}

/// Token login form, with an optional error notice
pub fn render_login_page(error: Option<&str>) -> String {
    let notice = error
        .map(|message| render_notice(NoticeLevel::Error, message))
        .unwrap_or_default();

    let body = format!(
        r#"<div class="wrap bdd-login">
<h1>Log in</h1>
{notice}
<form method="post" action="/admin/login">
<p><label for="bdd-login">Username</label><input type="text" id="bdd-login" name="login" autocomplete="username" required></p>
<p><label for="bdd-token">Access token</label><input type="password" id="bdd-token" name="token" autocomplete="current-password" required></p>
<p class="submit"><button type="submit" class="button button-primary">Log in</button></p>
</form>
</div>"#
    );

    layout("Log in", &body)
}

/// A dismissible notice with escaped text
pub fn render_notice(level: NoticeLevel, message: &str) -> String {
    format!(
        r#"<div class="notice {} is-dismissible"><p>{}</p></div>"#,
        level.css_class(),
        encode_text(message)
    )
}

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use tracing::{error, info, warn};

use super::{admin_page_path, ajax_error, AppState, AJAX_PATH};
use crate::admin::{render_admin_page, render_login_page, render_notice, AdminPageContext, NoticeLevel};
use crate::deleter::{AjaxResponse, DeleteForm, AJAX_ACTION};
use crate::security::{Actor, Capability};
use crate::storage::{SessionRepository, UserRepository};

const LOGIN_PATH: &str = "/admin/login";

#[derive(Debug, Deserialize)]
pub(super) struct LoginForm {
    #[serde(default)]
    login: String,
    #[serde(default)]
    token: String,
}

/// The actor behind the session cookie, anonymous when there is none
async fn resolve_actor(state: &AppState, cookies: &Cookies) -> crate::Result<Actor> {
    let Some(cookie) = cookies.get(&state.config.security.session_cookie) else {
        return Ok(Actor::anonymous());
    };

    let actor = SessionRepository::new(&state.db)
        .find_actor(cookie.value())
        .await?;
    Ok(actor.unwrap_or_else(Actor::anonymous))
}

fn session_cookie(name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn server_error(e: crate::Error) -> Response {
    error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_notice(NoticeLevel::Error, "An unexpected error occurred.")),
    )
        .into_response()
}

pub(super) async fn index() -> Redirect {
    Redirect::to(&admin_page_path())
}

pub(super) async fn health(State(state): State<AppState>) -> Response {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.db.pool())
        .await
    {
        Ok(_) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

pub(super) async fn admin_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    let actor = match resolve_actor(&state, &cookies).await {
        Ok(actor) => actor,
        Err(e) => return server_error(e),
    };

    if !actor.is_authenticated() {
        return Redirect::to(LOGIN_PATH).into_response();
    }
    if !actor.can(Capability::ManageOptions) {
        return (
            StatusCode::FORBIDDEN,
            Html(render_notice(
                NoticeLevel::Error,
                "Sorry, you are not allowed to access this page.",
            )),
        )
            .into_response();
    }

    let nonce = state.deleter.issue_nonce(&actor);
    let page = render_admin_page(&AdminPageContext {
        display_name: &actor.display_name,
        nonce: &nonce,
        ajax_url: AJAX_PATH,
    });

    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => server_error(e),
    }
}

pub(super) async fn login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    match resolve_actor(&state, &cookies).await {
        Ok(actor) if actor.is_authenticated() => Redirect::to(&admin_page_path()).into_response(),
        Ok(_) => Html(render_login_page(None)).into_response(),
        Err(e) => server_error(e),
    }
}

pub(super) async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let login = form.login.trim();
    let user = match UserRepository::new(&state.db)
        .find_by_token(form.token.trim())
        .await
    {
        Ok(Some(user)) if user.login == login => user,
        Ok(_) => {
            warn!("Failed login attempt for {:?}", login);
            return (
                StatusCode::UNAUTHORIZED,
                Html(render_login_page(Some("Invalid username or access token."))),
            )
                .into_response();
        }
        Err(e) => return server_error(e),
    };

    let security = &state.config.security;
    let token = match SessionRepository::new(&state.db)
        .create(user.id, security.session_lifetime_secs)
        .await
    {
        Ok(token) => token,
        Err(e) => return server_error(e),
    };

    cookies.add(session_cookie(&security.session_cookie, token));
    info!(user_id = user.id, "Logged in {}", user.login);

    Redirect::to(&admin_page_path()).into_response()
}

pub(super) async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let name = &state.config.security.session_cookie;
    if let Some(cookie) = cookies.get(name) {
        if let Err(e) = SessionRepository::new(&state.db).delete(cookie.value()).await {
            error!("Failed to end session: {}", e);
        }
    }

    cookies.remove(session_cookie(name, String::new()));
    Redirect::to(LOGIN_PATH)
}

/// The delete endpoint.
///
/// Once accepted, the deletion runs on its own task and finishes even if
/// the client goes away.
pub(super) async fn ajax(
    State(state): State<AppState>,
    cookies: Cookies,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!("Rejected undecodable delete request: {}", rejection);
            return ajax_error(StatusCode::BAD_REQUEST, "Unknown action.");
        }
    };

    if form.action != AJAX_ACTION {
        return ajax_error(StatusCode::BAD_REQUEST, "Unknown action.");
    }

    let actor = match resolve_actor(&state, &cookies).await {
        Ok(actor) => actor,
        Err(e) => {
            error!("Could not resolve session: {}", e);
            return ajax_error(StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.");
        }
    };

    let deleter = state.deleter.clone();
    let task = tokio::spawn(async move { deleter.handle(&actor, &form).await });

    match task.await {
        Ok(Ok(result)) => Json(AjaxResponse::success(result)).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            error!("Bulk delete task failed: {}", e);
            ajax_error(StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::router;
    use super::*;
    use crate::config::AppConfig;
    use crate::content::{CommentStatus, NewComment, NewUser, Role, DATETIME_FORMAT};
    use crate::storage::{CommentRepository, Database};
    use axum::{
        body::Body,
        http::{header, Request},
        Router,
    };
    use chrono::NaiveDateTime;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        app: Router,
        state: AppState,
        _uploads: TempDir,
    }

    async fn test_app() -> TestApp {
        let db = Database::new_in_memory().await.unwrap();
        let uploads = tempfile::tempdir().unwrap();

        let mut config = AppConfig::default();
        config.security.secret = "router-test-secret".to_string();
        config.storage.uploads_dir = Some(uploads.path().to_path_buf());

        let state = AppState::new(db, config);
        TestApp {
            app: router(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    /// Create a user with `role` and return a `Cookie` header value for a fresh session
    async fn session_for(state: &AppState, role: Role) -> String {
        let (user, _) = UserRepository::new(&state.db)
            .create(&NewUser {
                login: role.as_str().to_string(),
                display_name: format!("The {}", role.as_str()),
                email: format!("{}@example.com", role.as_str()),
                role,
            })
            .await
            .unwrap();
        let token = SessionRepository::new(&state.db)
            .create(user.id, 3600)
            .await
            .unwrap();
        format!("{}={}", state.config.security.session_cookie, token)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String, Option<String>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&body).to_string(), location)
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn nonce_from(html: &str) -> String {
        let marker = r#""nonce":""#;
        let start = html.find(marker).unwrap() + marker.len();
        html[start..start + 10].to_string()
    }

    async fn seed_comment(state: &AppState, date: &str) -> i64 {
        CommentRepository::new(&state.db)
            .create(&NewComment {
                post_id: 1,
                parent_id: None,
                author: "Visitor".to_string(),
                author_email: "visitor@example.com".to_string(),
                content: "<em>First!</em>".to_string(),
                status: CommentStatus::Pending,
                created_at: NaiveDateTime::parse_from_str(date, DATETIME_FORMAT).unwrap(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_health() {
        let t = test_app().await;
        let (status, body, _) = send(&t.app, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_admin_page_redirects_anonymous_to_login() {
        let t = test_app().await;
        let (status, _, location) =
            send(&t.app, get("/admin/tools/bulk-deleter-by-date", None)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/admin/login"));
    }

    #[tokio::test]
    async fn test_admin_page_forbidden_for_editor() {
        let t = test_app().await;
        let cookie = session_for(&t.state, Role::Editor).await;
        let (status, _, _) = send(
            &t.app,
            get("/admin/tools/bulk-deleter-by-date", Some(&cookie)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_end_to_end_delete() {
        let t = test_app().await;
        let cookie = session_for(&t.state, Role::Administrator).await;
        let kept = seed_comment(&t.state, "2024-02-01 10:00:00").await;
        seed_comment(&t.state, "2024-01-05 10:00:00").await;
        seed_comment(&t.state, "2024-01-31 10:00:00").await;

        let (status, html, _) = send(
            &t.app,
            get("/admin/tools/bulk-deleter-by-date", Some(&cookie)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let nonce = nonce_from(&html);

        let body = format!(
            "action=bdd_delete_items&nonce={nonce}&delete_type=comments&start_date=2024-01-01&end_date=2024-01-31"
        );
        let (status, body, _) = send(&t.app, post_form("/admin/ajax", Some(&cookie), &body)).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["message"], "Successfully deleted 2 comments.");
        assert_eq!(json["data"]["deleted_items"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"]["deleted_items"][0][3], "First!");
        assert_eq!(json["data"]["log_headers"][3], "Comment Excerpt");

        let remaining = CommentRepository::new(&t.state.db)
            .ids_in_range(&crate::content::DateRange::new(
                chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2100, 1, 1).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(remaining, vec![kept]);
    }

    #[tokio::test]
    async fn test_ajax_without_nonce_is_forbidden() {
        let t = test_app().await;
        let cookie = session_for(&t.state, Role::Administrator).await;
        seed_comment(&t.state, "2024-01-05 10:00:00").await;

        let (status, body, _) = send(
            &t.app,
            post_form(
                "/admin/ajax",
                Some(&cookie),
                "action=bdd_delete_items&delete_type=comments&start_date=2024-01-01&end_date=2024-01-31",
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["data"]["message"], "Security check failed.");
        assert_eq!(CommentRepository::new(&t.state.db).count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ajax_bad_dates_and_unknown_action() {
        let t = test_app().await;
        let cookie = session_for(&t.state, Role::Administrator).await;
        let (_, html, _) = send(
            &t.app,
            get("/admin/tools/bulk-deleter-by-date", Some(&cookie)),
        )
        .await;
        let nonce = nonce_from(&html);

        let body = format!(
            "action=bdd_delete_items&nonce={nonce}&delete_type=comments&start_date=2024%2F01%2F01&end_date=2024-01-31"
        );
        let (status, body, _) = send(&t.app, post_form("/admin/ajax", Some(&cookie), &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid date format. Please use YYYY-MM-DD."));

        let (status, body, _) = send(
            &t.app,
            post_form("/admin/ajax", Some(&cookie), "action=something_else"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Unknown action."));
    }

    #[tokio::test]
    async fn test_ajax_undecodable_body_gets_json_envelope() {
        let t = test_app().await;
        let cookie = session_for(&t.state, Role::Administrator).await;

        let (status, body, _) = send(
            &t.app,
            post_form("/admin/ajax", Some(&cookie), "action=bdd_delete_items&nonce=a&nonce=b"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["data"]["message"], "Unknown action.");

        let request = Request::builder()
            .method("POST")
            .uri("/admin/ajax")
            .header(header::CONTENT_TYPE, "text/plain")
            .header(header::COOKIE, &cookie)
            .body(Body::from("action=bdd_delete_items"))
            .unwrap();
        let (status, body, _) = send(&t.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let t = test_app().await;
        let (_, token) = UserRepository::new(&t.state.db)
            .create(&NewUser {
                login: "root".to_string(),
                display_name: "Root".to_string(),
                email: "root@example.com".to_string(),
                role: Role::Administrator,
            })
            .await
            .unwrap();

        let response = t
            .app
            .clone()
            .oneshot(post_form(
                "/admin/login",
                None,
                &format!("login=root&token={token}"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("datesweep_session="));
        assert!(set_cookie.contains("HttpOnly"));

        let (status, body, _) = send(
            &t.app,
            post_form("/admin/login", None, "login=root&token=wrong"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid username or access token."));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let t = test_app().await;
        let cookie = session_for(&t.state, Role::Administrator).await;

        let (status, _, location) = send(&t.app, post_form("/admin/logout", Some(&cookie), "")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/admin/login"));

        let (status, _, _) = send(
            &t.app,
            get("/admin/tools/bulk-deleter-by-date", Some(&cookie)),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_uploads_are_served() {
        let t = test_app().await;
        std::fs::write(t.state.config.uploads_dir().join("hello.txt"), "hi there").unwrap();

        let (status, body, _) = send(&t.app, get("/uploads/hello.txt", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hi there");
    }
}

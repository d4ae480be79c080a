//! HTTP surface: admin page, login, the delete endpoint and uploads

mod error;
mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::AppConfig;
use crate::deleter::{BulkDeleter, MENU_SLUG};
use crate::storage::Database;

pub use error::ajax_error;

/// Path of the delete endpoint
pub const AJAX_PATH: &str = "/admin/ajax";

/// Path of the bulk deleter page
pub fn admin_page_path() -> String {
    format!("/admin/tools/{}", MENU_SLUG)
}

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub deleter: Arc<BulkDeleter>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let deleter = BulkDeleter::from_database(&db, &config);
        Self {
            db,
            config: Arc::new(config),
            deleter: Arc::new(deleter),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.config.uploads_dir());

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route(&admin_page_path(), get(routes::admin_page))
        .route("/admin/login", get(routes::login_page).post(routes::login))
        .route("/admin/logout", post(routes::logout))
        .route(AJAX_PATH, post(routes::ajax))
        .nest_service("/uploads", uploads)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

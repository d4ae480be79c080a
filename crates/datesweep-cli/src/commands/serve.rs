use anyhow::{bail, Context, Result};
use tracing::info;

use datesweep_core::{
    storage::{Database, SessionRepository},
    web::{self, AppState},
    AppConfig,
};

pub async fn run(config: AppConfig, bind: Option<String>) -> Result<()> {
    if config.security.secret.is_empty() {
        bail!("security.secret is not set; run `datesweep init` first");
    }

    let uploads = config.uploads_dir();
    std::fs::create_dir_all(&uploads)
        .with_context(|| format!("creating {}", uploads.display()))?;

    let db = Database::new(&config).await?;
    let purged = SessionRepository::new(&db).purge_expired().await?;
    if purged > 0 {
        info!("Removed {} expired sessions", purged);
    }

    let addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let state = AppState::new(db, config);
    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on http://{}{}", addr, web::admin_page_path());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}

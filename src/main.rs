//! PNCP pricing service: binary entrypoint.
//! Boots the Axum HTTP server over the in-memory record source.

use std::sync::Arc;

use anyhow::{Context, Result};
use pncp_pricing::api::{self, AppState};
use pncp_pricing::config::AppConfig;
use pncp_pricing::metrics::Metrics;
use pncp_pricing::repository::{InMemoryRepository, RecordSource};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    pncp_pricing::init_tracing();

    let cfg = AppConfig::load_default()?;

    let repo = match &cfg.server.seed_path {
        Some(p) => InMemoryRepository::from_json_file(p)?,
        None => InMemoryRepository::demo(),
    }
    .with_matcher(cfg.matcher);
    info!(items = repo.len(), "record source ready");

    let source: Arc<dyn RecordSource> = Arc::new(repo);
    let mut app = api::router(AppState::new(source, cfg.compliance));
    match Metrics::init() {
        Ok(m) => app = app.merge(m.router()),
        Err(e) => warn!(error = ?e, "metrics disabled"),
    }

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("binding {}", cfg.server.bind))?;
    info!(addr = %cfg.server.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("http server")?;
    Ok(())
}

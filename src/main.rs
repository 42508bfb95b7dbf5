// This is the entry point of the news & notes web service.
//
// **Architecture Overview:**
// - `core/` = Business logic (HTTP-agnostic)
// - `infra/` = Implementations of core traits (SQLite, in-memory)
// - `web/` = HTTP adapters (routes, sessions, error mapping)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize stores and services (dependency injection)
// 3. Import the news fixture, if configured
// 4. Serve the router until Ctrl+C

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
mod settings;
#[path = "web/web_layer.rs"]
mod web;

use crate::core::news::NewNews;
use crate::infra::accounts::SqliteAccountStore;
use crate::infra::news::SqliteNewsStore;
use crate::infra::notes::SqliteNoteStore;
use crate::settings::Settings;
use crate::web::AppState;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Wire the SQLite stores. Accounts go first; news and notes reference users.
async fn sqlite_state(database_url: &str, settings: &Settings) -> anyhow::Result<AppState> {
    let pool = infra::database::connect(database_url)
        .await
        .context("Failed to open the database")?;

    let account_store = SqliteAccountStore::new(pool.clone());
    account_store.migrate().await?;
    let news_store = SqliteNewsStore::new(pool.clone());
    news_store.migrate().await?;
    let note_store = SqliteNoteStore::new(pool);
    note_store.migrate().await?;

    Ok(AppState::new(
        Arc::new(account_store),
        Arc::new(news_store),
        Arc::new(note_store),
        settings,
    ))
}

async fn load_news_fixture(state: &AppState, path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read news fixture {}", path.display()))?;
    let items: Vec<NewNews> = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed news fixture {}", path.display()))?;
    state.news.load_fixture(items).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();
    let settings = Settings::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let state = match &settings.database_url {
        Some(url) => sqlite_state(url, &settings).await?,
        None => {
            tracing::warn!("DATABASE_URL not set, data will live in memory only");
            AppState::in_memory(&settings)
        }
    };

    if let Some(path) = &settings.news_fixture_path {
        load_news_fixture(&state, path).await?;
    }

    // ========================================================================
    // HTTP SERVER
    // ========================================================================

    let app = web::app(state);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    tracing::info!("Listening on http://{}", settings.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

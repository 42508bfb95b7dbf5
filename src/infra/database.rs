// SQLite connection bootstrap shared by every sqlx-backed store.

use crate::core::storage::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Open a pool for `database_url` (`sqlite://path`, a bare path, or
/// `sqlite::memory:`), creating the file and its parent directory if needed.
pub async fn connect(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    let in_memory = database_url.contains(":memory:");

    let conn_str = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };

    if !in_memory {
        // Keep runtime databases in their own folder so the repo root stays tidy.
        let path_str = conn_str
            .trim_start_matches("sqlite://")
            .split('?')
            .next()
            .unwrap_or_default();
        if let Some(parent) = Path::new(path_str).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(&conn_str)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `:memory:` is a separate database, so pin one
    // connection and never let the pool recycle it.
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::info!("Connected to {}", database_url);
    Ok(pool)
}

/// Translate a sqlx failure into the core storage error.
pub fn storage_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return StoreError::NotFound;
        }
    }
    tracing::error!("Database error: {}", err);
    StoreError::Backend(err.to_string())
}

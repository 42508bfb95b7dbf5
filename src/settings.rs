// Runtime configuration, read from the environment (and `.env`, loaded by
// main before this runs).
//
// | Variable                | Default          |
// |-------------------------|------------------|
// | BIND_ADDR               | 127.0.0.1:8000   |
// | DATABASE_URL            | unset: in-memory |
// | NEWS_COUNT_ON_HOME_PAGE | 10               |
// | LOGIN_REDIRECT_URL      | /news/           |
// | NEWS_FIXTURE_PATH       | unset: no import |

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_NEWS_COUNT_ON_HOME_PAGE: usize = 10;
pub const DEFAULT_LOGIN_REDIRECT_URL: &str = "/news/";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// SQLite path or URL. `None` keeps everything in memory.
    pub database_url: Option<String>,
    pub news_count_on_home_page: usize,
    pub login_redirect_url: String,
    /// JSON array of news items imported into an empty news table.
    pub news_fixture_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: None,
            news_count_on_home_page: DEFAULT_NEWS_COUNT_ON_HOME_PAGE,
            login_redirect_url: DEFAULT_LOGIN_REDIRECT_URL.to_string(),
            news_fixture_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be an address like 127.0.0.1:8000")?;

        let news_count_on_home_page = match get("NEWS_COUNT_ON_HOME_PAGE") {
            Some(raw) => raw
                .parse::<usize>()
                .context("NEWS_COUNT_ON_HOME_PAGE must be a non-negative integer")?,
            None => DEFAULT_NEWS_COUNT_ON_HOME_PAGE,
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            news_count_on_home_page,
            login_redirect_url: get("LOGIN_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_LOGIN_REDIRECT_URL.to_string()),
            news_fixture_path: get("NEWS_FIXTURE_PATH").map(PathBuf::from),
        })
    }
}

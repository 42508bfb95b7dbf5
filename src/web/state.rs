// Shared application state handed to every handler.

use crate::core::accounts::{AccountService, AccountStore};
use crate::core::news::{NewsService, NewsStore};
use crate::core::notes::{NoteService, NoteStore};
use crate::infra::accounts::InMemoryAccountStore;
use crate::infra::news::InMemoryNewsStore;
use crate::infra::notes::InMemoryNoteStore;
use crate::settings::Settings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub news: Arc<NewsService>,
    pub notes: Arc<NoteService>,
    /// Default landing page after login.
    pub login_redirect_url: Arc<str>,
}

impl AppState {
    pub fn new(
        account_store: Arc<dyn AccountStore>,
        news_store: Arc<dyn NewsStore>,
        note_store: Arc<dyn NoteStore>,
        settings: &Settings,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(account_store)),
            news: Arc::new(NewsService::new(
                news_store,
                settings.news_count_on_home_page,
            )),
            notes: Arc::new(NoteService::new(note_store)),
            login_redirect_url: Arc::from(settings.login_redirect_url.as_str()),
        }
    }

    /// Everything kept in process memory; lost on restart.
    pub fn in_memory(settings: &Settings) -> Self {
        Self::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryNewsStore::new()),
            Arc::new(InMemoryNoteStore::new()),
            settings,
        )
    }
}

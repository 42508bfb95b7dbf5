// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

pub mod database;

#[path = "accounts/account_store.rs"]
pub mod accounts;

#[path = "news/news_store.rs"]
pub mod news;

#[path = "notes/note_store.rs"]
pub mod notes;

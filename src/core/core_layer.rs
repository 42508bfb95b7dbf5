// The core module contains all business logic.
// Each feature gets its own submodule; shared ports live at the top.

#[path = "access/ownership.rs"]
pub mod access;

#[path = "accounts/mod.rs"]
pub mod accounts;

pub mod forms;

#[path = "news/mod.rs"]
pub mod news;

#[path = "notes/mod.rs"]
pub mod notes;

pub mod storage;

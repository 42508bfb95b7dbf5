// Implementations for user accounts and login sessions.

pub mod in_memory;
pub mod sqlite_store;

// Re-export for convenience
pub use in_memory::InMemoryAccountStore;
pub use sqlite_store::SqliteAccountStore;

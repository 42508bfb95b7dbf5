// Implementations for news and comment storage.

pub mod in_memory;
pub mod sqlite_store;

// Re-export for convenience
pub use in_memory::InMemoryNewsStore;
pub use sqlite_store::SqliteNewsStore;

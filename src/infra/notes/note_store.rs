// Implementations for note storage.

pub mod in_memory;
pub mod sqlite_store;

// Re-export for convenience
pub use in_memory::InMemoryNoteStore;
pub use sqlite_store::SqliteNoteStore;

// Storage port errors shared by every feature store.
//
// The infra layer translates backend failures (sqlx, in-memory bookkeeping)
// into these variants so core services never see a database type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Backend(String),

    /// A unique constraint (username, slug) rejected the write.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// The referenced row does not exist (foreign key target, update target).
    #[error("Record not found")]
    NotFound,
}

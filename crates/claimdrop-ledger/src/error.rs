//! Error types for the ledger module.

use claimdrop_core::ClaimKey;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A lock guarding ledger state was poisoned by a panicking thread.
    #[error("ledger lock poisoned: {0}")]
    Poisoned(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// `commit` or `rollback` on a key that has no pending entry.
    #[error("no pending entry for claim {0}")]
    NotPending(ClaimKey),
}

impl LedgerError {
    pub(crate) fn poisoned(err: impl std::fmt::Display) -> Self {
        LedgerError::Poisoned(err.to_string())
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

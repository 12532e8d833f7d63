//! Error types for tabula-sync

use thiserror::Error as ThisError;

/// Result type for tabula-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the synchronization engine
#[derive(Debug, ThisError)]
pub enum Error {
    /// A forwarded domain mutation was rejected by the store
    #[error("domain error: {0}")]
    Domain(#[from] tabula_core::Error),
}

// Compile-time check that Error is Send + Sync.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}

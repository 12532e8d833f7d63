//! Error types for tabula-core

use crate::{AreaId, FieldId, TableId};
use thiserror::Error;

/// Result type for tabula-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the structural mutation surface
///
/// These only signal misuse with ids that are no longer (or never were)
/// part of the diagram; callers treating such changes as stale are
/// expected to drop them and continue.
#[derive(Debug, Error)]
pub enum Error {
    /// Table id not present in the diagram
    #[error("table {0} not found")]
    UnknownTable(TableId),

    /// Field id not present on the given table
    #[error("field {field} not found on table {table}")]
    UnknownField { table: TableId, field: FieldId },

    /// Area id not present in the diagram
    #[error("area {0} not found")]
    UnknownArea(AreaId),
}

// Compile-time check that Error is Send + Sync.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}

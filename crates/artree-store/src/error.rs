use std::io;
use std::path::PathBuf;

use artree_types::Identifier;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Persisting an object failed.
    #[error("failed to write object {id} to {}: {source}", path.display())]
    Write {
        id: Identifier,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        expected: Identifier,
        computed: Identifier,
    },

    /// The object data is not a canonical artifact tree.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: Identifier, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

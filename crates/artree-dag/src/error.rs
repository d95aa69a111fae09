//! Error types for artifact tree operations.

use artree_crypto::HashError;
use artree_types::TypeError;

/// Errors that can occur while building or parsing an artifact tree.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// Hashing the content of a reference failed (short/long read, I/O).
    #[error(transparent)]
    Hash(#[from] HashError),

    /// A precomputed identity failed validation.
    #[error(transparent)]
    Identifier(#[from] TypeError),

    /// Canonical text could not be parsed back into a tree.
    #[error("canonical tree line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        reason: String,
    },
}

impl DagError {
    /// Returns `true` if the stream length did not match its declared length.
    pub fn is_length_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Hash(HashError::ShortRead { .. } | HashError::LongRead { .. })
        )
    }
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;

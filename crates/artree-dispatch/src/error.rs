use std::io;
use std::path::PathBuf;

/// Errors that abort a whole dispatch.
///
/// A single file that cannot be hashed is not one of these; it is recorded
/// as a [`TaskFailure`](crate::TaskFailure) in the report.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    /// Every worker has exited, so nothing can receive new tasks.
    #[error("dispatcher is closed")]
    Closed,

    #[error("cannot walk {}: {reason}", path.display())]
    Walk { path: PathBuf, reason: String },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

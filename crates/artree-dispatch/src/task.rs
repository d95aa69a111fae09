use std::fmt;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use artree_dag::{ArtifactTree, BomRef, DagError};
use artree_types::Identifier;

/// One file to hash into a tree.
#[derive(Clone)]
pub struct FileTask {
    pub path: PathBuf,
    /// Size recorded when the file was enumerated. A file that grows or
    /// shrinks before it is read fails with a length mismatch.
    pub declared_size: u64,
    pub tree: Arc<ArtifactTree>,
    pub bom: Option<Identifier>,
}

impl FileTask {
    pub(crate) fn run(&self) -> Result<Identifier, TaskError> {
        let file = File::open(&self.path).map_err(TaskError::Open)?;
        let bom = self.bom.as_ref().map(BomRef::Opaque);
        let identity = self
            .tree
            .add_reference_from_reader(file, self.declared_size, bom)?;
        Ok(identity)
    }
}

impl fmt::Debug for FileTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileTask")
            .field("path", &self.path)
            .field("declared_size", &self.declared_size)
            .field("bom", &self.bom)
            .finish_non_exhaustive()
    }
}

/// Why a single task failed.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("cannot open: {0}")]
    Open(#[source] io::Error),

    #[error(transparent)]
    Hash(#[from] DagError),
}

/// A task that failed, kept for the report.
#[derive(Debug)]
pub struct TaskFailure {
    pub path: PathBuf,
    pub error: TaskError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

use std::io;
use std::path::PathBuf;

use artree_types::Identifier;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: artree_dag::DagError,
    },

    #[error("object not found: {0}")]
    ObjectNotFound(Identifier),

    #[error("invalid identity: {0}")]
    Identifier(#[from] artree_types::TypeError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] artree_dispatch::DispatchError),

    #[error("store error: {0}")]
    Store(#[from] artree_store::StoreError),
}

pub type SdkResult<T> = Result<T, SdkError>;

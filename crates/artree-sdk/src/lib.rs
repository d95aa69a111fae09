//! High-level SDK for artree.
//!
//! Ties the hash engine, the artifact tree, the worker pool and the object
//! store together into the operations the command line exposes. This is the
//! main entry point for applications embedding artree.

pub mod config;
pub mod error;
pub mod operations;

pub use config::ArtreeConfig;
pub use error::{SdkError, SdkResult};
pub use operations::{build_artifact_tree, build_bom, hash_object, show_object, BomOutcome, BuildOutcome};

// Re-export key types
pub use artree_dag::{ArtifactTree, BomRef, Reference};
pub use artree_dispatch::{DispatchReport, FailurePolicy, TaskFailure};
pub use artree_types::{DigestConfig, Identifier};

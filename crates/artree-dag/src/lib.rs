//! Artifact trees: the nodes of a build provenance Merkle DAG.
//!
//! An [`ArtifactTree`] records the set of inputs used to produce a build
//! artifact. Each entry is a [`Reference`] holding the content identity of
//! one input and, optionally, the identity of the tree that documents how
//! that input was itself built. A tree's own identity is the hash of its
//! canonical text, so trees nest exactly like git objects.
//!
//! # Invariants
//!
//! - At most one reference per content identity; the first insert wins.
//! - Canonical text is sorted by identity, independent of insertion order.
//! - A tree's identity is recomputed from its current contents on every call.

pub mod canonical;
pub mod error;
pub mod reference;
pub mod tree;

pub use canonical::CanonicalTree;
pub use error::{DagError, DagResult};
pub use reference::{BomRef, Reference};
pub use tree::ArtifactTree;

//! Content-addressed storage for artifact trees.
//!
//! Trees are stored as their canonical text, keyed by their identity, in a
//! layout analogous to git's loose objects (without compression):
//!
//! ```text
//! <root>/object/<first 2 hex>/<remaining hex>
//! <root>/object/sha1+sha256/<first 2 hex>/<remaining hex>
//! ```
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one file per object under a root directory
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written; writing an existing object is a no-op.
//! 2. Writes are atomic: a temp file in the target directory is renamed into place.
//! 3. Reads of trees re-hash the content and reject mismatches.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::StoredObject;
pub use traits::ObjectStore;

use artree_dag::ArtifactTree;
use artree_types::Identifier;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; the same identity always maps to
///   the same content.
/// - Writing an object that already exists is a no-op.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by identity.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &Identifier) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its identity.
    fn write(&self, object: &StoredObject) -> StoreResult<Identifier>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &Identifier) -> StoreResult<bool>;

    /// Persist the current canonical text of `tree`.
    fn write_tree(&self, tree: &ArtifactTree) -> StoreResult<Identifier> {
        self.write(&StoredObject::from_tree(tree))
    }

    /// Read, verify and parse a stored tree.
    fn read_tree(&self, id: &Identifier) -> StoreResult<Option<ArtifactTree>> {
        self.read(id)?.map(|object| object.to_tree()).transpose()
    }
}

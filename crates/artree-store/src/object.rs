use artree_crypto::HashEngine;
use artree_dag::ArtifactTree;
use artree_types::{DigestConfig, Identifier};

use crate::error::{StoreError, StoreResult};

/// A stored object: identity + canonical tree text.
///
/// `StoredObject` is the unit of storage. Backends never interpret `data`;
/// only [`StoredObject::to_tree`] does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Identity the object is keyed by.
    pub id: Identifier,
    /// Canonical text bytes.
    pub data: Vec<u8>,
}

impl StoredObject {
    /// Hash `data` under `config` and wrap it.
    pub fn new(config: DigestConfig, data: Vec<u8>) -> Self {
        let id = HashEngine::new(config).identity_of(&data);
        Self { id, data }
    }

    /// Snapshot a tree's canonical text and identity.
    pub fn from_tree(tree: &ArtifactTree) -> Self {
        let canonical = tree.canonical();
        Self {
            id: canonical.identity,
            data: canonical.text.into_bytes(),
        }
    }

    /// The size of `data` in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Re-hash `data` and compare against `id`.
    pub fn verify(&self) -> StoreResult<()> {
        let computed = HashEngine::new(self.id.config()).identity_of(&self.data);
        if computed != self.id {
            return Err(StoreError::HashMismatch {
                expected: self.id.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Verify and decode into an artifact tree.
    pub fn to_tree(&self) -> StoreResult<ArtifactTree> {
        self.verify()?;
        let text = std::str::from_utf8(&self.data).map_err(|e| StoreError::CorruptObject {
            id: self.id.clone(),
            reason: e.to_string(),
        })?;
        ArtifactTree::from_canonical(self.id.config(), text).map_err(|e| StoreError::CorruptObject {
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

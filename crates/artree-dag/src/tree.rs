//! The artifact tree and its synchronized reference set.
//!
//! [`ArtifactTree`] owns a [`ReferenceSet`] behind a single mutex. Hashing
//! happens outside the lock; only the insert, the sorted snapshot and the
//! serialization run inside it. Many workers can therefore stream files into
//! one tree while inserts stay mutually exclusive.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::sync::{Mutex, MutexGuard, PoisonError};

use artree_crypto::HashEngine;
use artree_types::{DigestConfig, Identifier};
use tracing::debug;

use crate::canonical::CanonicalTree;
use crate::error::DagResult;
use crate::reference::{BomRef, Reference};

/// Deduplicated set of references keyed by content identity.
///
/// Iteration order is ascending identity, which is the canonical order.
#[derive(Default)]
struct ReferenceSet {
    entries: BTreeMap<Identifier, Reference>,
}

impl ReferenceSet {
    /// Insert unless an entry with the same identity exists. Returns `true`
    /// if the set changed.
    fn insert_if_absent(&mut self, reference: Reference) -> bool {
        if self.entries.contains_key(reference.identity()) {
            return false;
        }
        self.entries.insert(reference.identity().clone(), reference);
        true
    }

    fn snapshot_sorted(&self) -> Vec<Reference> {
        self.entries.values().cloned().collect()
    }

    fn serialize(&self) -> String {
        self.entries.values().map(Reference::to_line).collect()
    }
}

/// A deduplicated, order-independent set of content references with a
/// recursive self-identity.
///
/// The tree is safe to share between threads (`Arc<ArtifactTree>`); every
/// operation takes `&self`. There is no seal state: reads always reflect
/// the latest inserts.
pub struct ArtifactTree {
    engine: HashEngine,
    refs: Mutex<ReferenceSet>,
}

impl ArtifactTree {
    /// Create an empty tree hashing with `config`.
    pub fn new(config: DigestConfig) -> Self {
        Self {
            engine: HashEngine::new(config),
            refs: Mutex::new(ReferenceSet::default()),
        }
    }

    /// Create an empty SHA-1 tree.
    pub fn sha1() -> Self {
        Self::new(DigestConfig::Sha1)
    }

    /// Create an empty SHA-256 tree.
    pub fn sha256() -> Self {
        Self::new(DigestConfig::Sha256)
    }

    pub fn config(&self) -> DigestConfig {
        self.engine.config()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Hash `content` and insert it.
    ///
    /// Re-adding content that is already present is a no-op: the existing
    /// entry, including its bom, is kept. Returns the content identity.
    pub fn add_reference(&self, content: &[u8], bom: Option<BomRef<'_>>) -> DagResult<Identifier> {
        let identity = self.engine.identity_of(content);
        let bom = bom.map(|b| b.identifier());
        self.insert(Reference::new(identity.clone(), bom));
        Ok(identity)
    }

    /// Stream exactly `declared_len` bytes from `reader` and insert them.
    ///
    /// Short and long reads are returned as errors and leave the tree
    /// unchanged.
    pub fn add_reference_from_reader<R: Read>(
        &self,
        reader: R,
        declared_len: u64,
        bom: Option<BomRef<'_>>,
    ) -> DagResult<Identifier> {
        let identity = self.engine.identity_of_reader(reader, declared_len)?;
        let bom = bom.map(|b| b.identifier());
        self.insert(Reference::new(identity.clone(), bom));
        Ok(identity)
    }

    /// Insert a precomputed identity without a bom.
    ///
    /// The identity must match this tree's digest configuration; malformed
    /// values are rejected before the tree is touched.
    pub fn add_existing_reference(&self, identity: &str) -> DagResult<Identifier> {
        let identity = Identifier::parse_for(identity, self.config())?;
        self.insert(Reference::new(identity.clone(), None));
        Ok(identity)
    }

    fn insert(&self, reference: Reference) {
        let short = reference.identity().short_hex().to_owned();
        let inserted = self.lock().insert_if_absent(reference);
        debug!(identity = %short, inserted, "add reference");
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// All references in canonical (ascending identity) order.
    pub fn references(&self) -> Vec<Reference> {
        self.lock().snapshot_sorted()
    }

    /// Canonical text: one `blob <id>[ bom <id>]\n` line per reference,
    /// ascending by identity. An empty tree serializes to `""`.
    pub fn serialize(&self) -> String {
        self.lock().serialize()
    }

    /// Identity of this tree: the content identity of its canonical text.
    ///
    /// Recomputed from the current contents on every call.
    pub fn identity(&self) -> Identifier {
        self.canonical().identity
    }

    /// Canonical text together with its identity, both from one snapshot.
    pub fn canonical(&self) -> CanonicalTree {
        let text = self.serialize();
        let identity = self.engine.identity_of(text.as_bytes());
        CanonicalTree { text, identity }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Returns `true` if a reference with `identity` is present.
    pub fn contains(&self, identity: &Identifier) -> bool {
        self.lock().entries.contains_key(identity)
    }

    /// The stored reference for `identity`, if present.
    pub fn get(&self, identity: &Identifier) -> Option<Reference> {
        self.lock().entries.get(identity).cloned()
    }

    pub(crate) fn from_references(config: DigestConfig, references: Vec<Reference>) -> Self {
        let tree = Self::new(config);
        {
            let mut set = tree.lock();
            for reference in references {
                set.insert_if_absent(reference);
            }
        }
        tree
    }

    fn lock(&self) -> MutexGuard<'_, ReferenceSet> {
        // The set is never left half-updated, so a poisoned lock is still usable.
        self.refs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ArtifactTree {
    fn default() -> Self {
        Self::sha1()
    }
}

impl fmt::Debug for ArtifactTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactTree")
            .field("config", &self.config())
            .field("references", &self.len())
            .finish()
    }
}

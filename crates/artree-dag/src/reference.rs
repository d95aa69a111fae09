//! Tree entries and the bom pointers they may carry.

use std::cmp::Ordering;
use std::fmt;

use artree_types::Identifier;

use crate::tree::ArtifactTree;

/// One entry of an artifact tree.
///
/// Equality and ordering consider only the content identity. The `bom`
/// pointer records which tree documents how the content was built; it is
/// informational and never takes part in deduplication.
#[derive(Clone, Debug)]
pub struct Reference {
    identity: Identifier,
    bom: Option<Identifier>,
}

impl Reference {
    pub fn new(identity: Identifier, bom: Option<Identifier>) -> Self {
        Self { identity, bom }
    }

    /// Content identity of the referenced object.
    pub fn identity(&self) -> &Identifier {
        &self.identity
    }

    /// Identity of the tree documenting this object's own inputs, if any.
    pub fn bom(&self) -> Option<&Identifier> {
        self.bom.as_ref()
    }

    /// The canonical line for this entry, including the trailing newline.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob {}", self.identity)?;
        if let Some(bom) = &self.bom {
            write!(f, " bom {bom}")?;
        }
        f.write_str("\n")
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Reference {}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}

/// Where a reference's bom identity comes from.
///
/// A tree that is available locally is resolved to its identity at the
/// moment the reference is inserted; an opaque identifier is used as is.
#[derive(Clone, Copy, Debug)]
pub enum BomRef<'a> {
    /// A tree built in this process.
    Tree(&'a ArtifactTree),
    /// A precomputed identity whose tree content is not available.
    Opaque(&'a Identifier),
}

impl BomRef<'_> {
    /// The identity this bom points at.
    pub fn identifier(&self) -> Identifier {
        match self {
            Self::Tree(tree) => tree.identity(),
            Self::Opaque(id) => (*id).clone(),
        }
    }
}

impl<'a> From<&'a ArtifactTree> for BomRef<'a> {
    fn from(tree: &'a ArtifactTree) -> Self {
        Self::Tree(tree)
    }
}

impl<'a> From<&'a Identifier> for BomRef<'a> {
    fn from(id: &'a Identifier) -> Self {
        Self::Opaque(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: char) -> Identifier {
        Identifier::parse_any(&c.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn line_without_bom() {
        let r = Reference::new(id('a'), None);
        assert_eq!(r.to_line(), format!("blob {}\n", "a".repeat(40)));
    }

    #[test]
    fn line_with_bom() {
        let r = Reference::new(id('a'), Some(id('b')));
        assert_eq!(
            r.to_line(),
            format!("blob {} bom {}\n", "a".repeat(40), "b".repeat(40))
        );
    }

    #[test]
    fn equality_ignores_bom() {
        let plain = Reference::new(id('a'), None);
        let with_bom = Reference::new(id('a'), Some(id('c')));
        assert_eq!(plain, with_bom);
        assert!(Reference::new(id('1'), None) < plain);
    }

    #[test]
    fn opaque_bom_resolves_to_itself() {
        let bom = id('d');
        assert_eq!(BomRef::from(&bom).identifier(), bom);
    }

    #[test]
    fn tree_bom_resolves_to_tree_identity() {
        let tree = ArtifactTree::sha1();
        tree.add_reference(b"hello", None).unwrap();
        assert_eq!(BomRef::from(&tree).identifier(), tree.identity());
    }
}

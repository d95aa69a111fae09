//! Canonical text of an artifact tree and its inverse.
//!
//! ```text
//! blob <identity>\n
//! blob <identity> bom <identity>\n
//! ```
//!
//! Lines are strictly ascending by identity, each terminated by `\n`, with no
//! blank lines. The empty tree is the empty string.

use artree_types::{DigestConfig, Identifier};

use crate::error::{DagError, DagResult};
use crate::reference::Reference;
use crate::tree::ArtifactTree;

/// A tree's canonical text together with the identity computed from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalTree {
    pub text: String,
    pub identity: Identifier,
}

impl ArtifactTree {
    /// Rebuild a tree from its canonical text.
    ///
    /// Entry identities must match `config`; bom identities may use any
    /// configuration. Anything that would not re-serialize to exactly `text`
    /// is rejected.
    pub fn from_canonical(config: DigestConfig, text: &str) -> DagResult<Self> {
        let mut references: Vec<Reference> = Vec::new();

        for (idx, raw) in text.split_inclusive('\n').enumerate() {
            let line = idx + 1;
            let parse_err = |reason: &str| DagError::Parse {
                line,
                reason: reason.to_owned(),
            };

            let body = raw
                .strip_suffix('\n')
                .ok_or_else(|| parse_err("missing trailing newline"))?;
            let rest = body
                .strip_prefix("blob ")
                .ok_or_else(|| parse_err("expected `blob <identity>`"))?;

            let (identity, bom) = match rest.split_once(" bom ") {
                Some((identity, bom)) => (identity, Some(Identifier::parse_any(bom)?)),
                None => (rest, None),
            };
            let identity = Identifier::parse_for(identity, config)?;

            if let Some(prev) = references.last() {
                if prev.identity() >= &identity {
                    return Err(parse_err("entries are not strictly ascending"));
                }
            }
            references.push(Reference::new(identity, bom));
        }

        Ok(Self::from_references(config, references))
    }
}

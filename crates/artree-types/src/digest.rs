use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A single digest algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
    /// 160-bit SHA-1, the git object default.
    Sha1,
    /// 256-bit SHA-256.
    Sha256,
}

impl HashAlgorithm {
    pub const ALL: [Self; 2] = [Self::Sha1, Self::Sha256];

    /// The algorithm producing digests of `len` bytes, if any.
    pub fn from_digest_len(len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|algorithm| algorithm.digest_len() == len)
    }

    /// Digest length in bytes.
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    /// Digest length in lowercase hex characters.
    pub const fn hex_len(&self) -> usize {
        self.digest_len() * 2
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The digest algorithm(s) a tree hashes its entries and itself with.
///
/// Single-algorithm configurations produce plain hex identities. The
/// composite configuration joins its digests with `+` in the fixed order
/// returned by [`DigestConfig::algorithms`] and prefixes the result with
/// `sha1+sha256:` so stored objects stay distinguishable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestConfig {
    #[default]
    #[serde(rename = "sha1")]
    Sha1,
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha1+sha256")]
    Sha1Sha256,
}

impl DigestConfig {
    /// Every supported configuration.
    pub const ALL: [Self; 3] = [Self::Sha1, Self::Sha256, Self::Sha1Sha256];

    /// Algorithms in the order their digests appear in an identity.
    pub const fn algorithms(&self) -> &'static [HashAlgorithm] {
        match self {
            Self::Sha1 => &[HashAlgorithm::Sha1],
            Self::Sha256 => &[HashAlgorithm::Sha256],
            Self::Sha1Sha256 => &[HashAlgorithm::Sha1, HashAlgorithm::Sha256],
        }
    }

    /// Configuration name as accepted by [`FromStr`] and the config file.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha1Sha256 => "sha1+sha256",
        }
    }

    /// Prefix carried by identities of this configuration, if any.
    pub const fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Sha1Sha256 => Some("sha1+sha256"),
            Self::Sha1 | Self::Sha256 => None,
        }
    }

    pub const fn is_composite(&self) -> bool {
        self.algorithms().len() > 1
    }
}

impl fmt::Display for DigestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestConfig {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|config| config.name() == s)
            .ok_or_else(|| TypeError::UnknownDigest(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lengths() {
        assert_eq!(HashAlgorithm::Sha1.hex_len(), 40);
        assert_eq!(HashAlgorithm::Sha256.hex_len(), 64);
    }

    #[test]
    fn default_is_sha1() {
        assert_eq!(DigestConfig::default(), DigestConfig::Sha1);
    }

    #[test]
    fn composite_order_is_fixed() {
        assert_eq!(
            DigestConfig::Sha1Sha256.algorithms(),
            &[HashAlgorithm::Sha1, HashAlgorithm::Sha256]
        );
        assert!(DigestConfig::Sha1Sha256.is_composite());
        assert!(!DigestConfig::Sha256.is_composite());
    }

    #[test]
    fn only_composite_is_tagged() {
        assert_eq!(DigestConfig::Sha1.tag(), None);
        assert_eq!(DigestConfig::Sha256.tag(), None);
        assert_eq!(DigestConfig::Sha1Sha256.tag(), Some("sha1+sha256"));
    }

    #[test]
    fn parse_names() {
        for config in DigestConfig::ALL {
            assert_eq!(config.name().parse::<DigestConfig>().unwrap(), config);
        }
        assert_eq!(
            "md5".parse::<DigestConfig>(),
            Err(TypeError::UnknownDigest("md5".into()))
        );
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&DigestConfig::Sha1Sha256).unwrap();
        assert_eq!(json, "\"sha1+sha256\"");
        let parsed: DigestConfig = serde_json::from_str("\"sha256\"").unwrap();
        assert_eq!(parsed, DigestConfig::Sha256);
    }
}

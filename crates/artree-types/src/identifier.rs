use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::digest::{DigestConfig, HashAlgorithm};
use crate::error::TypeError;

/// Validated identity string for a blob or an artifact tree.
///
/// An `Identifier` never carries content. It exists to point at a tree whose
/// content is not locally available, or whose hash was computed elsewhere.
/// Every constructor validates the value, so an `Identifier` always holds
/// canonical lowercase hex of the expected digest length(s).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Parse a single-digest identity of `expected_len` decoded bytes.
    ///
    /// No normalization is applied: case, surrounding or embedded whitespace
    /// and odd lengths are all rejected. `expected_len` must be the digest
    /// length of a supported algorithm.
    pub fn parse(value: &str, expected_len: usize) -> Result<Self, TypeError> {
        let algorithm = HashAlgorithm::from_digest_len(expected_len).ok_or_else(|| {
            TypeError::malformed(value, format!("no supported digest is {expected_len} bytes"))
        })?;
        check_digest(value, value, algorithm.digest_len())?;
        Ok(Self(value.to_owned()))
    }

    /// Parse an identity against the full shape of `config`.
    pub fn parse_for(value: &str, config: DigestConfig) -> Result<Self, TypeError> {
        let digests = match config.tag() {
            None => value,
            Some(tag) => value
                .strip_prefix(tag)
                .and_then(|rest| rest.strip_prefix(':'))
                .ok_or_else(|| TypeError::malformed(value, format!("missing `{tag}:` prefix")))?,
        };

        let algorithms = config.algorithms();
        let parts: Vec<&str> = digests.split('+').collect();
        if parts.len() != algorithms.len() {
            return Err(TypeError::malformed(
                value,
                format!(
                    "expected {} digest(s) for {config}, found {}",
                    algorithms.len(),
                    parts.len()
                ),
            ));
        }
        for (part, algorithm) in parts.iter().zip(algorithms) {
            check_digest(value, part, algorithm.digest_len())?;
        }
        Ok(Self(value.to_owned()))
    }

    /// Parse an identity of any supported configuration.
    ///
    /// Used for bom values, which may come from a tree hashed with a
    /// different configuration than the one referencing it.
    pub fn parse_any(value: &str) -> Result<Self, TypeError> {
        let config = if value.contains(':') {
            DigestConfig::Sha1Sha256
        } else if value.len() == DigestConfig::Sha256.algorithms()[0].hex_len() {
            DigestConfig::Sha256
        } else {
            DigestConfig::Sha1
        };
        Self::parse_for(value, config)
    }

    /// Format raw digests computed under `config`.
    ///
    /// `digests` must be in the order of [`DigestConfig::algorithms`].
    pub fn from_digests<D: AsRef<[u8]>>(config: DigestConfig, digests: &[D]) -> Self {
        let joined = digests
            .iter()
            .map(hex::encode)
            .collect::<Vec<_>>()
            .join("+");
        match config.tag() {
            Some(tag) => Self(format!("{tag}:{joined}")),
            None => Self(joined),
        }
    }

    /// The configuration this identity was produced under, inferred from its shape.
    pub fn config(&self) -> DigestConfig {
        if self.0.contains(':') {
            DigestConfig::Sha1Sha256
        } else if self.0.len() == DigestConfig::Sha1.algorithms()[0].hex_len() {
            DigestConfig::Sha1
        } else {
            DigestConfig::Sha256
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The digest portion of the identity, without any configuration tag.
    pub fn digest_hex(&self) -> &str {
        match self.0.split_once(':') {
            Some((_, digests)) => digests,
            None => &self.0,
        }
    }

    /// Short hex representation (first 8 characters of the digest).
    pub fn short_hex(&self) -> &str {
        let digest = self.digest_hex();
        &digest[..digest.len().min(8)]
    }
}

fn check_digest(value: &str, digest: &str, expected_len: usize) -> Result<(), TypeError> {
    if digest.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(TypeError::malformed(value, "uppercase hex is not canonical"));
    }
    let bytes = hex::decode(digest).map_err(|e| TypeError::malformed(value, e.to_string()))?;
    if bytes.len() != expected_len {
        return Err(TypeError::malformed(
            value,
            format!("expected {expected_len} bytes, got {}", bytes.len()),
        ));
    }
    Ok(())
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.short_hex())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_any(s)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse_any(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA1_ID: &str = "23294b0610492cf55c1c4835216f20d376a287dd";
    const SHA256_ID: &str = "a87d2b20b13568a5530ec6a59dacfdda8ee3cd1e3d63c9d13da26d27e3447812";

    fn is_malformed(result: Result<Identifier, TypeError>) -> bool {
        matches!(result, Err(TypeError::MalformedIdentifier { .. }))
    }

    #[test]
    fn accepts_40_hex_for_sha1() {
        let id = Identifier::parse(SHA1_ID, 20).unwrap();
        assert_eq!(id.as_str(), SHA1_ID);
    }

    #[test]
    fn rejects_lengths_no_algorithm_produces() {
        assert!(is_malformed(Identifier::parse("", 0)));
        assert!(is_malformed(Identifier::parse(&SHA1_ID[..32], 16)));
        assert!(is_malformed(Identifier::parse(&"a".repeat(128), 64)));
    }

    #[test]
    fn parsed_lengths_map_to_their_config() {
        assert_eq!(Identifier::parse(SHA1_ID, 20).unwrap().config(), DigestConfig::Sha1);
        assert_eq!(Identifier::parse(SHA256_ID, 32).unwrap().config(), DigestConfig::Sha256);
    }

    #[test]
    fn rejects_39_characters() {
        assert!(is_malformed(Identifier::parse(&SHA1_ID[..39], 20)));
    }

    #[test]
    fn rejects_38_characters_by_length() {
        assert!(is_malformed(Identifier::parse(&SHA1_ID[..38], 20)));
    }

    #[test]
    fn rejects_non_hex_character() {
        let value = format!("{}g", &SHA1_ID[..39]);
        assert!(is_malformed(Identifier::parse(&value, 20)));
    }

    #[test]
    fn rejects_whitespace() {
        assert!(is_malformed(Identifier::parse(&format!("{SHA1_ID} "), 20)));
        assert!(is_malformed(Identifier::parse(&format!(" {SHA1_ID} "), 20)));
        assert!(is_malformed(Identifier::parse(
            " 23294b0610492cf 55c1c4835216f20d376a287dd ",
            20
        )));
    }

    #[test]
    fn rejects_uppercase() {
        assert!(is_malformed(Identifier::parse(&SHA1_ID.to_uppercase(), 20)));
    }

    #[test]
    fn rejects_wrong_algorithm_length() {
        assert!(is_malformed(Identifier::parse(SHA256_ID, 20)));
        assert!(is_malformed(Identifier::parse(SHA1_ID, 32)));
        assert!(is_malformed(Identifier::parse_for(SHA256_ID, DigestConfig::Sha1)));
    }

    #[test]
    fn composite_shape() {
        let value = format!("sha1+sha256:{SHA1_ID}+{SHA256_ID}");
        let id = Identifier::parse_for(&value, DigestConfig::Sha1Sha256).unwrap();
        assert_eq!(id.digest_hex(), format!("{SHA1_ID}+{SHA256_ID}"));
        assert_eq!(id.config(), DigestConfig::Sha1Sha256);

        // Missing tag, swapped order and a single digest are all rejected.
        let untagged = format!("{SHA1_ID}+{SHA256_ID}");
        assert!(is_malformed(Identifier::parse_for(&untagged, DigestConfig::Sha1Sha256)));
        let swapped = format!("sha1+sha256:{SHA256_ID}+{SHA1_ID}");
        assert!(is_malformed(Identifier::parse_for(&swapped, DigestConfig::Sha1Sha256)));
        let single = format!("sha1+sha256:{SHA1_ID}");
        assert!(is_malformed(Identifier::parse_for(&single, DigestConfig::Sha1Sha256)));
    }

    #[test]
    fn parse_any_infers_config() {
        assert_eq!(Identifier::parse_any(SHA1_ID).unwrap().config(), DigestConfig::Sha1);
        assert_eq!(Identifier::parse_any(SHA256_ID).unwrap().config(), DigestConfig::Sha256);
        assert!(Identifier::parse_any("abcd").is_err());
    }

    #[test]
    fn from_digests_formats_hex() {
        let id = Identifier::from_digests(DigestConfig::Sha1, &[[0xab_u8; 20]]);
        assert_eq!(id.as_str(), "ab".repeat(20));
        assert_eq!(id.short_hex(), "abababab");

        let composite =
            Identifier::from_digests(DigestConfig::Sha1Sha256, &[vec![0x01; 20], vec![0x02; 32]]);
        assert!(composite.as_str().starts_with("sha1+sha256:0101"));
        assert!(Identifier::parse_for(composite.as_str(), DigestConfig::Sha1Sha256).is_ok());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let id = Identifier::parse_any(SHA1_ID).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SHA1_ID}\""));
        let parsed: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<Identifier>("\"not-hex\"").is_err());
    }

    #[test]
    fn ordering_follows_string_order() {
        let low = Identifier::parse_any(&"0".repeat(40)).unwrap();
        let high = Identifier::parse_any(&"f".repeat(40)).unwrap();
        assert!(low < high);
    }

    proptest::proptest! {
        #[test]
        fn any_20_bytes_round_trip(bytes in proptest::collection::vec(proptest::num::u8::ANY, 20)) {
            let id = Identifier::from_digests(DigestConfig::Sha1, &[bytes]);
            proptest::prop_assert_eq!(Identifier::parse(id.as_str(), 20), Ok(id));
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use artree_dispatch::{DispatchConfig, FailurePolicy};
use artree_store::LooseObjectStore;
use artree_types::DigestConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SdkError, SdkResult};

/// Settings shared by every operation.
///
/// Read from TOML; every field is optional and falls back to its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtreeConfig {
    /// Root of the loose object store.
    pub store_root: PathBuf,
    pub digest: DigestConfig,
    /// Upper bound on hashing threads; unset means one per available core.
    pub max_workers: Option<usize>,
    pub channel_capacity: usize,
    /// Stop at the first file that cannot be hashed.
    pub fail_fast: bool,
}

impl ArtreeConfig {
    /// Looked up in the working directory when no file is given explicitly.
    pub const FILE_NAME: &'static str = "artree.toml";

    pub fn from_toml(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| SdkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `explicit` if given, else `<dir>/artree.toml` if it exists, else
    /// the defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> SdkResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(Self::FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_workers: self.max_workers,
            channel_capacity: self.channel_capacity,
            failure_policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::BestEffort
            },
        }
    }

    pub fn store(&self) -> LooseObjectStore {
        LooseObjectStore::new(&self.store_root)
    }
}

impl Default for ArtreeConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from(".bom"),
            digest: DigestConfig::default(),
            max_workers: None,
            channel_capacity: DispatchConfig::DEFAULT_CHANNEL_CAPACITY,
            fail_fast: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ArtreeConfig::default();
        assert_eq!(c.store_root, PathBuf::from(".bom"));
        assert_eq!(c.digest, DigestConfig::Sha1);
        assert_eq!(c.max_workers, None);
        assert_eq!(c.channel_capacity, 64);
        assert!(!c.fail_fast);
        assert_eq!(c.dispatch_config().failure_policy, FailurePolicy::BestEffort);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ArtreeConfig::from_toml("digest = \"sha1+sha256\"\nmax_workers = 2\n").unwrap();
        assert_eq!(c.digest, DigestConfig::Sha1Sha256);
        assert_eq!(c.max_workers, Some(2));
        assert_eq!(c.store_root, PathBuf::from(".bom"));
    }

    #[test]
    fn rejects_unknown_keys_and_digests() {
        assert!(matches!(
            ArtreeConfig::from_toml("colour = true"),
            Err(SdkError::Config(_))
        ));
        assert!(ArtreeConfig::from_toml("digest = \"md5\"").is_err());
    }

    #[test]
    fn resolve_prefers_explicit_then_local_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ArtreeConfig::resolve(None, dir.path()).unwrap(),
            ArtreeConfig::default()
        );

        std::fs::write(dir.path().join(ArtreeConfig::FILE_NAME), "fail_fast = true\n").unwrap();
        assert!(ArtreeConfig::resolve(None, dir.path()).unwrap().fail_fast);

        let other = dir.path().join("other.toml");
        std::fs::write(&other, "store_root = \"objects\"\n").unwrap();
        let c = ArtreeConfig::resolve(Some(&other), dir.path()).unwrap();
        assert_eq!(c.store_root, PathBuf::from("objects"));
        assert!(!c.fail_fast);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtreeConfig::resolve(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, SdkError::Io { .. }));
    }
}

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use artree_crypto::HashEngine;
use artree_dag::{ArtifactTree, BomRef};
use artree_dispatch::{DispatchReport, Dispatcher};
use artree_store::ObjectStore;
use artree_types::Identifier;
use tracing::{info, warn};

use crate::config::ArtreeConfig;
use crate::error::{SdkError, SdkResult};

/// Result of hashing a set of paths into one persisted tree.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Identity of the tree as persisted.
    pub identity: Identifier,
    pub tree: Arc<ArtifactTree>,
    pub report: DispatchReport,
}

/// Result of [`build_bom`].
#[derive(Debug)]
pub struct BomOutcome {
    /// Blob identity of the artifact itself.
    pub artifact: Identifier,
    /// Identity of the single-entry tree describing the artifact.
    pub identity: Identifier,
    /// The tree over the artifact's inputs.
    pub dependencies: BuildOutcome,
}

/// Hash every file under `paths` into a new tree and persist it.
///
/// Files that cannot be read are reported in [`BuildOutcome::report`]; the
/// tree of everything else is still persisted. A path that cannot be walked
/// at all aborts the operation.
pub fn build_artifact_tree<P: AsRef<Path>>(paths: &[P], config: &ArtreeConfig) -> SdkResult<BuildOutcome> {
    let tree = Arc::new(ArtifactTree::new(config.digest));
    let report = hash_paths(paths, &tree, config)?;
    let identity = config.store().write_tree(&tree)?;
    info!(identity = %identity, entries = tree.len(), "artifact tree stored");
    Ok(BuildOutcome {
        identity,
        tree,
        report,
    })
}

/// Describe how `artifact` was built from `dependencies`.
///
/// Two trees are persisted: the tree over `dependencies`, and a tree whose
/// only entry is `artifact` with the first tree as its bom.
pub fn build_bom<P: AsRef<Path>>(
    artifact: &Path,
    dependencies: &[P],
    config: &ArtreeConfig,
) -> SdkResult<BomOutcome> {
    let dependencies = build_artifact_tree(dependencies, config)?;

    let tree = ArtifactTree::new(config.digest);
    let (file, len) = open_sized(artifact)?;
    let artifact_id = tree
        .add_reference_from_reader(file, len, Some(BomRef::Tree(&dependencies.tree)))
        .map_err(|source| SdkError::Read {
            path: artifact.to_path_buf(),
            source,
        })?;
    let identity = config.store().write_tree(&tree)?;
    info!(artifact = %artifact_id, identity = %identity, bom = %dependencies.identity, "bom stored");

    Ok(BomOutcome {
        artifact: artifact_id,
        identity,
        dependencies,
    })
}

/// Blob identity of a single file. Nothing is stored.
pub fn hash_object(path: &Path, config: &ArtreeConfig) -> SdkResult<Identifier> {
    let (file, len) = open_sized(path)?;
    HashEngine::new(config.digest)
        .identity_of_reader(file, len)
        .map_err(|e| SdkError::Read {
            path: path.to_path_buf(),
            source: e.into(),
        })
}

/// Read and verify a stored tree.
pub fn show_object(identity: &str, config: &ArtreeConfig) -> SdkResult<ArtifactTree> {
    let id = Identifier::parse_any(identity)?;
    config
        .store()
        .read_tree(&id)?
        .ok_or(SdkError::ObjectNotFound(id))
}

fn hash_paths<P: AsRef<Path>>(
    paths: &[P],
    tree: &Arc<ArtifactTree>,
    config: &ArtreeConfig,
) -> SdkResult<DispatchReport> {
    let mut dispatcher = Dispatcher::start(&config.dispatch_config())?;
    for path in paths {
        if let Err(e) = dispatcher.submit_path(path.as_ref(), tree, None) {
            dispatcher.cancel_token().cancel();
            if let Err(join) = dispatcher.finish() {
                warn!(error = %join, "workers did not shut down cleanly");
            }
            return Err(e.into());
        }
    }
    Ok(dispatcher.finish()?)
}

fn open_sized(path: &Path) -> SdkResult<(File, u64)> {
    let io_err = |source| SdkError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let len = file.metadata().map_err(io_err)?.len();
    Ok((file, len))
}

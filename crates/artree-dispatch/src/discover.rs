use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{DispatchError, DispatchResult};

/// A regular file found under a root, with its size at enumeration time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Recursively enumerate the regular files under `root`.
///
/// Symlinks are followed and every yielded path is canonical, so the same
/// file reached twice yields the same path. `root` may itself be a file.
/// Directories and other non-regular entries are not yielded.
pub fn discover(root: &Path) -> impl Iterator<Item = DispatchResult<DiscoveredFile>> + '_ {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    return Some(Err(walk_error(path, e)));
                }
            };
            if !entry.file_type().is_file() {
                return None;
            }
            Some(resolve(entry.path()))
        })
}

fn resolve(path: &Path) -> DispatchResult<DiscoveredFile> {
    let canonical = fs::canonicalize(path).map_err(|e| walk_error(path.to_path_buf(), e))?;
    let meta = fs::metadata(&canonical).map_err(|e| walk_error(canonical.clone(), e))?;
    Ok(DiscoveredFile {
        path: canonical,
        size: meta.len(),
    })
}

fn walk_error(path: PathBuf, reason: impl ToString) -> DispatchError {
    DispatchError::Walk {
        path,
        reason: reason.to_string(),
    }
}

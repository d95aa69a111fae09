use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use artree_types::Identifier;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Directory under the store root holding all objects.
pub const OBJECT_DIR: &str = "object";

/// One-file-per-object store rooted at a directory.
///
/// Objects land at `<root>/object/<aa>/<rest>` where `aa` is the first two
/// hex characters of the digest. Composite identities get an extra
/// `sha1+sha256/` level so they never collide with single-digest objects.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    root: PathBuf,
}

impl LooseObjectStore {
    /// Open a store at `root`. Directories are created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the object for `id` lives, whether or not it exists yet.
    pub fn object_path(&self, id: &Identifier) -> PathBuf {
        let mut path = self.root.join(OBJECT_DIR);
        if let Some(tag) = id.config().tag() {
            path.push(tag);
        }
        let (fan_out, rest) = id.digest_hex().split_at(2);
        path.push(fan_out);
        path.push(rest);
        path
    }

    fn persist(&self, id: &Identifier, path: &Path, data: &[u8]) -> io::Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "object path has no parent"))?;
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        trace!(id = %id.short_hex(), path = %path.display(), "object persisted");
        Ok(())
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &Identifier) -> StoreResult<Option<StoredObject>> {
        match fs::read(self.object_path(id)) {
            Ok(data) => Ok(Some(StoredObject {
                id: id.clone(),
                data,
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, object: &StoredObject) -> StoreResult<Identifier> {
        object.verify()?;
        let path = self.object_path(&object.id);
        if self.exists(&object.id)? {
            debug!(id = %object.id, "object already stored");
            return Ok(object.id.clone());
        }

        self.persist(&object.id, &path, &object.data)
            .map_err(|source| StoreError::Write {
                id: object.id.clone(),
                path: path.clone(),
                source,
            })?;
        debug!(id = %object.id, bytes = object.size(), "stored object");
        Ok(object.id.clone())
    }

    fn exists(&self, id: &Identifier) -> StoreResult<bool> {
        match fs::metadata(self.object_path(id)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

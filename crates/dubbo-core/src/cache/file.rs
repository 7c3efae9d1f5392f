//! File-backed store: one file per key under a base directory.
//!
//! Writes go to a temp file with a PID+TID suffix, are synced, then renamed
//! over the target so readers never see a half-written listing.

use super::{CacheKey, KvStore};
use crate::config::RegistryConfig;
use crate::{DubboError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing::debug;

/// Key-value store keeping each value in `<base_dir>/<key>`.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Failover tier under `<root>/failover`.
    pub fn failover_in(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(RegistryConfig::FAILOVER_DIR_NAME))
    }

    /// Snapshot tier under `<root>/snapshot`.
    pub fn snapshot_in(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(RegistryConfig::SNAPSHOT_DIR_NAME))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.base_dir.join(key.as_str())
    }
}

impl KvStore for FileStore {
    fn read(&self, key: &CacheKey) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DubboError::io_with_path(e, path)),
        }
    }

    fn write(&self, key: &CacheKey, value: &str) -> Result<()> {
        fs::create_dir_all(&self.base_dir).map_err(|e| DubboError::Io {
            message: format!("Failed to create directory {}", self.base_dir.display()),
            path: Some(self.base_dir.clone()),
            source: Some(e),
        })?;

        let path = self.path_for(key);
        let temp_path = self
            .base_dir
            .join(format!(".{}.{}.{}.tmp", key, process::id(), thread_id()));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| DubboError::Io {
                    message: format!("Failed to create temp file {}", temp_path.display()),
                    path: Some(temp_path.clone()),
                    source: Some(e),
                })?;

            file.write_all(value.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| DubboError::Io {
                    message: format!("Failed to write temp file {}", temp_path.display()),
                    path: Some(temp_path.clone()),
                    source: Some(e),
                })?;
        }

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(DubboError::Io {
                message: format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    path.display()
                ),
                path: Some(path),
                source: Some(e),
            });
        }

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn exists(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.path_for(key).is_file())
    }
}

/// Get a unique thread identifier.
fn thread_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    format!("{:?}", thread::current().id()).hash(&mut hasher);
    hasher.finish()
}

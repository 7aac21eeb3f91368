//! Local filesystem sink, used for `--output-dir` and in tests.

use super::{StorageError, StorageSink};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes each document to `{root}/{bucket}/{key}`, creating parent
/// directories as needed.
pub struct DirectorySink {
    root: PathBuf,
    default_bucket: String,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, default_bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            default_bucket: default_bucket.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path a key lands at.
    pub fn path_for(&self, key: &str, bucket: Option<&str>) -> PathBuf {
        self.root
            .join(bucket.unwrap_or(&self.default_bucket))
            .join(key.trim_start_matches('/'))
    }
}

impl StorageSink for DirectorySink {
    fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    fn upload(&self, key: &str, body: &[u8], bucket: Option<&str>) -> Result<(), StorageError> {
        let path = self.path_for(key, bucket);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        info!(path = %path.display(), bytes = body.len(), "wrote document");
        Ok(())
    }
}

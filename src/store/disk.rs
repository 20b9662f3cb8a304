use std::path::{Component, Path, PathBuf};

use bytes::Bytes;

use super::{FileStore, StoreError};

/// Serves files from a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a logical path onto the root directory.
    ///
    /// Returns `None` when the path tries to leave the root (`..`, absolute
    /// components after the leading slash, drive prefixes).
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();

        for component in relative.components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return None;
                }
            }
        }

        Some(resolved)
    }
}

impl FileStore for DiskStore {
    async fn read(&self, path: &str) -> Result<Bytes, StoreError> {
        let file_path = self
            .resolve(path)
            .ok_or_else(|| StoreError::PermissionDenied(path.to_string()))?;

        let data = tokio::fs::read(&file_path)
            .await
            .map_err(|e| StoreError::from_io(path, e))?;

        Ok(Bytes::from(data))
    }
}

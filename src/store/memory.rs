use std::collections::{HashMap, HashSet};

use bytes::Bytes;

use super::{FileStore, StoreError};

/// In-memory content, keyed by logical path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Bytes>,
    denied: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(path, data);
        self
    }

    /// Makes reads of `path` fail with `PermissionDenied`.
    pub fn with_denied(mut self, path: impl Into<String>) -> Self {
        self.denied.insert(path.into());
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.files.insert(path.into(), data.into());
    }
}

impl FileStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Bytes, StoreError> {
        if self.denied.contains(path) {
            return Err(StoreError::PermissionDenied(path.to_string()));
        }

        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}

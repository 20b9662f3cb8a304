//! Content lookup by logical path.
//!
//! The dispatcher only sees the [`FileStore`] trait; the daemon plugs in
//! [`DiskStore`], tests and embedders can use [`MemoryStore`].

pub mod disk;
pub mod memory;

use std::future::Future;

use bytes::Bytes;
use thiserror::Error;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Why a lookup produced no content.
///
/// The dispatcher answers all of these with a 404 but logs them differently.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resource {0:?} not found")]
    NotFound(String),

    #[error("permission denied for resource {0:?}")]
    PermissionDenied(String),

    #[error("failed to read resource {path:?}: {source}")]
    Other {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Sorts an I/O error for `path` into the store error kinds.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                StoreError::PermissionDenied(path.to_string())
            }
            _ => StoreError::Other {
                path: path.to_string(),
                source: err,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Read-only key-value view of the served content.
///
/// Paths are logical request paths such as `/index.html`.
pub trait FileStore: Send + Sync + 'static {
    fn read(&self, path: &str) -> impl Future<Output = Result<Bytes, StoreError>> + Send;
}

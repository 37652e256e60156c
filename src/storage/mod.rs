//! Output sinks for decoded leaf parts.

use std::path::PathBuf;

use bytes::Bytes;

use crate::StorageError;

/// Disk-backed storage backend implementation.
pub mod disk;
/// In-memory storage backend implementation.
pub mod memory;
pub use disk::{DiskStorage, DiskStorageBuilder};
pub use memory::MemoryStorage;

/// Metadata describing one decoded output after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name the output was written under.
    pub file_name: String,
    /// Content type declared by the part, empty when absent.
    pub content_type: String,
    /// Decoded size in bytes.
    pub size: u64,
    /// Final filesystem path when stored on disk.
    pub path: Option<PathBuf>,
}

/// Async trait abstraction for "write bytes to a named destination".
#[async_trait::async_trait]
pub trait StorageEngine: Send + Sync + 'static {
    /// Writes one decoded blob under `file_name`, replacing any previous blob of that name.
    async fn store(
        &self,
        file_name: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredFile, StorageError>;
}

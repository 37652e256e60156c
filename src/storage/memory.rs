use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;

use super::{StorageEngine, StoredFile};
use crate::StorageError;

/// In-memory storage engine keyed by output file name.
///
/// Every write is recorded in order, so overwrites of a repeated name stay
/// observable through [`MemoryStorage::writes`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    writes: Arc<RwLock<Vec<(String, Bytes)>>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory storage backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest bytes written under `file_name`.
    pub async fn get(&self, file_name: &str) -> Option<Bytes> {
        self.writes
            .read()
            .await
            .iter()
            .rev()
            .find(|(name, _)| name == file_name)
            .map(|(_, body)| body.clone())
    }

    /// Returns every write in arrival order.
    pub async fn writes(&self) -> Vec<(String, Bytes)> {
        self.writes.read().await.clone()
    }

    /// Returns the sorted, de-duplicated set of names written so far.
    pub async fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .writes
            .read()
            .await
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Returns the number of distinct names currently stored.
    pub async fn len(&self) -> usize {
        self.file_names().await.len()
    }

    /// Returns `true` when nothing was written.
    pub async fn is_empty(&self) -> bool {
        self.writes.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl StorageEngine for MemoryStorage {
    async fn store(
        &self,
        file_name: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredFile, StorageError> {
        let size = body.len() as u64;
        self.writes.write().await.push((file_name.to_owned(), body));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            file_name = file_name,
            size = size,
            "memory storage: completed store"
        );

        Ok(StoredFile {
            file_name: file_name.to_owned(),
            content_type: content_type.to_owned(),
            size,
            path: None,
        })
    }
}

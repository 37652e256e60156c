use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use super::{StorageEngine, StoredFile};
use crate::{naming::sanitize_filename, StorageError};

/// Permission bits of written files on Unix.
pub const FILE_MODE: u32 = 0o644;

/// Builder for [`DiskStorage`].
#[derive(Debug, Clone)]
pub struct DiskStorageBuilder {
    root: PathBuf,
}

impl DiskStorageBuilder {
    /// Sets the directory used for persisted files.
    pub fn destination(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Alias for [`DiskStorageBuilder::destination`].
    pub fn path(self, root: impl Into<PathBuf>) -> Self {
        self.destination(root)
    }

    /// Builds a validated disk storage backend.
    pub fn build(self) -> Result<DiskStorage, StorageError> {
        if self.root.as_os_str().is_empty() {
            return Err(StorageError::new("disk storage root path cannot be empty"));
        }

        Ok(DiskStorage { root: self.root })
    }
}

impl Default for DiskStorageBuilder {
    fn default() -> Self {
        Self {
            root: PathBuf::from("out"),
        }
    }
}

/// Disk-backed storage engine writing files under a configured root path.
///
/// Files are created with mode `0644` and truncated when they already exist.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Creates a disk storage builder.
    pub fn builder() -> DiskStorageBuilder {
        DiskStorageBuilder::default()
    }

    /// Output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl StorageEngine for DiskStorage {
    async fn store(
        &self,
        file_name: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<StoredFile, StorageError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            file_name = file_name,
            content_type = content_type,
            root = %self.root.display(),
            "disk storage: begin store"
        );

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| StorageError::new(format!("failed to create storage directory: {err}")))?;

        let output_path = self.root.join(sanitize_filename(file_name));

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let mut file = options.open(&output_path).await.map_err(|err| {
            StorageError::new(format!(
                "failed to create output file `{}`: {err}",
                output_path.display()
            ))
        })?;

        file.write_all(&body)
            .await
            .map_err(|err| StorageError::new(format!("failed to write output file: {err}")))?;
        file.flush()
            .await
            .map_err(|err| StorageError::new(format!("failed to flush output file: {err}")))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            size = body.len(),
            path = %output_path.display(),
            "disk storage: completed store"
        );

        Ok(StoredFile {
            file_name: file_name.to_owned(),
            content_type: content_type.to_owned(),
            size: body.len() as u64,
            path: Some(output_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_empty_root() {
        let err = DiskStorage::builder().destination("").build().expect_err("must fail");
        assert!(err.to_string().contains("cannot be empty"));
    }
}

use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::path::BlobPath;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Path-addressed blob storage that mints a download URL for every write.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at `path`, replacing any existing blob, and return a
    /// download URL for the new blob.
    async fn put(&self, path: &BlobPath, data: &[u8]) -> Result<String, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(path, reader).await
    }

    /// Store data from an async reader at `path` and return a download URL.
    async fn put_stream(&self, path: &BlobPath, reader: BoxReader)
    -> Result<String, StorageError>;

    /// Retrieve all bytes of the blob at `path`.
    async fn get(&self, path: &BlobPath) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(path).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve the blob at `path` as a streaming async reader.
    async fn get_stream(&self, path: &BlobPath) -> Result<BoxReader, StorageError>;

    /// Check whether a blob exists at `path`.
    async fn exists(&self, path: &BlobPath) -> Result<bool, StorageError>;

    /// Delete the blob at `path`.
    ///
    /// Deleting a path with no blob is a [`StorageError::NotFound`] error so
    /// callers can tell a completed removal from a skipped one.
    async fn delete(&self, path: &BlobPath) -> Result<(), StorageError>;
}

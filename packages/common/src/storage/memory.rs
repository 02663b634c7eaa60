use std::collections::HashMap;
use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::StorageError;
use super::path::{BlobPath, download_url};
use super::traits::{BlobStore, BoxReader};

const DEFAULT_BASE_URL: &str = "memory://catalog/o";

/// In-memory path-addressed blob store.
///
/// Backs tests and embedders that do not want a disk root. Minted URLs use
/// the same shape as the filesystem store so URL parsing behaves identically.
pub struct MemoryBlobStore {
    base_url: String,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    fn mint_url(&self, path: &BlobPath) -> String {
        download_url(&self.base_url, path, &Uuid::new_v4().to_string())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &BlobPath, data: &[u8]) -> Result<String, StorageError> {
        let mut blobs = self.blobs.write().await;
        blobs.insert(path.as_str().to_owned(), data.to_vec());
        Ok(self.mint_url(path))
    }

    async fn put_stream(
        &self,
        path: &BlobPath,
        mut reader: BoxReader,
    ) -> Result<String, StorageError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        self.put(path, &data).await
    }

    async fn get(&self, path: &BlobPath) -> Result<Vec<u8>, StorageError> {
        let blobs = self.blobs.read().await;
        blobs
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn get_stream(&self, path: &BlobPath) -> Result<BoxReader, StorageError> {
        let data = self.get(path).await?;
        Ok(Box::new(Cursor::new(data)))
    }

    async fn exists(&self, path: &BlobPath) -> Result<bool, StorageError> {
        let blobs = self.blobs.read().await;
        Ok(blobs.contains_key(path.as_str()))
    }

    async fn delete(&self, path: &BlobPath) -> Result<(), StorageError> {
        let mut blobs = self.blobs.write().await;
        match blobs.remove(path.as_str()) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }
}

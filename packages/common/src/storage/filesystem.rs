use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};
use uuid::Uuid;

use super::error::StorageError;
use super::path::{BlobPath, download_url};
use super::traits::{BlobStore, BoxReader};
use crate::config::BlobStorageConfig;

/// Filesystem-backed path-addressed blob store.
///
/// Blob paths map directly onto the directory tree below `root`; writing
/// `category_images/logo.png` produces `{root}/category_images/logo.png`.
/// Every successful write mints a download URL with a fresh access token.
pub struct FilesystemBlobStore {
    root: PathBuf,
    base_url: String,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store rooted at `root`.
    pub async fn new(
        root: PathBuf,
        base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            base_url: base_url.into(),
            max_size,
        })
    }

    /// Open a store as configured.
    pub async fn from_config(config: &BlobStorageConfig) -> Result<Self, StorageError> {
        Self::new(
            config.root.clone(),
            config.public_base_url.clone(),
            config.max_blob_size,
        )
        .await
    }

    /// Compute the filesystem location for a blob path.
    fn blob_file(&self, path: &BlobPath) -> PathBuf {
        path.as_str()
            .split('/')
            .fold(self.root.clone(), |file, segment| file.join(segment))
    }

    /// Path for a temporary file during writes.
    fn temp_file(&self) -> PathBuf {
        self.root.join(".tmp").join(Uuid::new_v4().to_string())
    }

    fn mint_url(&self, path: &BlobPath) -> String {
        download_url(&self.base_url, path, &Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, path: &BlobPath, data: &[u8]) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::TooLarge {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let blob_file = self.blob_file(path);

        let temp_file = self.temp_file();
        if let Err(e) = fs::write(&temp_file, data).await {
            let _ = fs::remove_file(&temp_file).await;
            return Err(e.into());
        }

        if let Some(parent) = blob_file.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Rename replaces any existing blob at the path in one step.
        if let Err(e) = fs::rename(&temp_file, &blob_file).await {
            let _ = fs::remove_file(&temp_file).await;
            return Err(e.into());
        }

        Ok(self.mint_url(path))
    }

    async fn put_stream(
        &self,
        path: &BlobPath,
        mut reader: BoxReader,
    ) -> Result<String, StorageError> {
        let temp_file = self.temp_file();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut out = fs::File::create(&temp_file).await?;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(out);
                let _ = fs::remove_file(&temp_file).await;
                return Err(StorageError::TooLarge {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            tokio::io::AsyncWriteExt::write_all(&mut out, &buf[..n]).await?;
        }

        tokio::io::AsyncWriteExt::flush(&mut out).await?;
        drop(out);

        let blob_file = self.blob_file(path);

        if let Some(parent) = blob_file.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_file, &blob_file).await {
            let _ = fs::remove_file(&temp_file).await;
            return Err(e.into());
        }

        Ok(self.mint_url(path))
    }

    async fn get_stream(&self, path: &BlobPath) -> Result<BoxReader, StorageError> {
        let blob_file = self.blob_file(path);
        match fs::File::open(&blob_file).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &BlobPath) -> Result<bool, StorageError> {
        let blob_file = self.blob_file(path);
        Ok(fs::try_exists(&blob_file).await?)
    }

    async fn delete(&self, path: &BlobPath) -> Result<(), StorageError> {
        let blob_file = self.blob_file(path);
        match fs::remove_file(&blob_file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

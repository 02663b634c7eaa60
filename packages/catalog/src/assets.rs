use std::sync::Arc;

use chrono::Utc;
use common::storage::{BlobPath, BlobStore, path_from_url};
use tracing::{info, instrument};

use crate::error::CatalogError;

/// Uploads category images into one blob directory and takes them back out
/// by their download URL.
///
/// An upload lands at `{dir}/{millis}_{file_name}`, so two uploads of the
/// same file name in the same millisecond write the same path and the later
/// one wins. The minted download URL embeds that path and is what gets
/// persisted on the category.
#[derive(Clone)]
pub struct ImageAssetManager {
    store: Arc<dyn BlobStore>,
    dir: String,
}

impl ImageAssetManager {
    pub fn new(store: Arc<dyn BlobStore>, dir: impl Into<String>) -> Self {
        Self {
            store,
            dir: dir.into(),
        }
    }

    /// The blob directory uploads land in.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Store image bytes and return the download URL to persist.
    ///
    /// File names may not contain `/`: the URL convention keeps the whole
    /// upload under one directory level, and a deeper path could not be
    /// recovered from its URL again.
    #[instrument(skip(self, data), fields(dir = %self.dir))]
    pub async fn upload(&self, file_name: &str, data: &[u8]) -> Result<String, CatalogError> {
        if file_name.contains('/') {
            return Err(CatalogError::Validation(
                "image file name must not contain '/'".into(),
            ));
        }
        let stamped = format!("{}_{}", Utc::now().timestamp_millis(), file_name);
        let path = BlobPath::in_dir(&self.dir, &stamped).map_err(CatalogError::Upload)?;
        let url = self
            .store
            .put(&path, data)
            .await
            .map_err(CatalogError::Upload)?;
        info!(path = %path, size = data.len(), "Image uploaded");
        Ok(url)
    }

    /// Delete the blob a download URL points at.
    #[instrument(skip(self), fields(dir = %self.dir))]
    pub async fn remove(&self, url: &str) -> Result<(), CatalogError> {
        let path = path_from_url(url, &self.dir).map_err(CatalogError::Removal)?;
        self.store
            .delete(&path)
            .await
            .map_err(CatalogError::Removal)?;
        info!(path = %path, "Image removed");
        Ok(())
    }
}

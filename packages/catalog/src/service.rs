use std::sync::Arc;

use common::metadata::MetadataStore;
use common::storage::BlobStore;
use serde_json::Value;

use crate::assets::ImageAssetManager;
use crate::category::{Category, CategoryId};
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::projection::{CategoryListProjection, decode_snapshot};
use crate::repository::CategoryRepository;

/// The category catalog: one metadata namespace of records plus the image
/// blobs they point at.
///
/// Every operation the embedding application drives goes through here.
/// Writes keep the two stores consistent in one direction: an image is
/// uploaded before any record references it, so a stored record never
/// points at a blob that was not there first. Blobs nothing references can
/// accumulate; they are tolerated, never surfaced.
pub struct CatalogService {
    repository: CategoryRepository,
    assets: ImageAssetManager,
    metadata: Arc<dyn MetadataStore>,
}

impl CatalogService {
    pub fn new(
        config: &CatalogConfig,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Result<Self, CatalogError> {
        let assets = ImageAssetManager::new(blobs, config.image_dir.clone());
        Ok(Self {
            repository: CategoryRepository::new(metadata.clone(), assets.clone(), config)?,
            assets,
            metadata,
        })
    }

    /// Upload image bytes and return the download URL to put on a category.
    pub async fn upload_image(&self, file_name: &str, data: &[u8]) -> Result<String, CatalogError> {
        self.assets.upload(file_name, data).await
    }

    /// Delete the image blob a download URL points at.
    pub async fn remove_image(&self, url: &str) -> Result<(), CatalogError> {
        self.assets.remove(url).await
    }

    /// Create a category. A supplied image URL must come from
    /// [`upload_image`](Self::upload_image).
    pub async fn create_category(
        &self,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Category, CatalogError> {
        self.repository.create(name, image_url).await
    }

    /// Rewrite an existing category's name and image URL; `None` clears the
    /// stored URL.
    pub async fn update_category(
        &self,
        id: &CategoryId,
        name: &str,
        image_url: Option<String>,
    ) -> Result<(), CatalogError> {
        self.repository.update(id, name, image_url).await
    }

    /// Delete a category together with its image blob.
    pub async fn delete_category(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        self.repository.delete(id).await
    }

    /// Read one category. Absent ids read as `None`.
    pub async fn category(&self, id: &CategoryId) -> Result<Option<Category>, CatalogError> {
        self.repository.get(id).await
    }

    /// One-shot ordered listing of every category.
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let snapshot = self.metadata.get(self.repository.namespace()).await?;
        Ok(decode_snapshot(&snapshot.unwrap_or(Value::Null)))
    }

    /// Attach a live projection of the category list.
    pub async fn watch_categories(&self) -> Result<CategoryListProjection, CatalogError> {
        CategoryListProjection::attach(self.metadata.as_ref(), self.repository.namespace()).await
    }
}

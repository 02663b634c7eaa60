use std::sync::Arc;

use chrono::Utc;
use common::metadata::{MetadataError, MetadataStore, TreePath};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::assets::ImageAssetManager;
use crate::category::{Category, CategoryId};
use crate::config::CatalogConfig;
use crate::error::CatalogError;

/// Mints category ids from the clock.
///
/// An id is a millisecond timestamp rendered as a string. Minting twice in
/// the same millisecond yields consecutive values, so ids are unique and
/// strictly increasing within one process.
struct IdMinter {
    last: Mutex<i64>,
}

impl IdMinter {
    fn new() -> Self {
        Self {
            last: Mutex::new(0),
        }
    }

    async fn mint(&self) -> CategoryId {
        let mut last = self.last.lock().await;
        *last = Utc::now().timestamp_millis().max(*last + 1);
        CategoryId::from(last.to_string())
    }
}

/// Reads and writes category records under one metadata namespace.
///
/// Records live at `{namespace}/{id}` and hold the full wire form of a
/// [`Category`]. Creation stamps the configured classification constants
/// onto the record; updates rewrite only the operator-facing fields. Where
/// an operation touches both stores, the blob side goes first, so a record
/// write never points at an image that was not already there.
pub struct CategoryRepository {
    store: Arc<dyn MetadataStore>,
    assets: ImageAssetManager,
    namespace: TreePath,
    gen_type: String,
    general_code: i64,
    company_id: String,
    ids: IdMinter,
}

impl CategoryRepository {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        assets: ImageAssetManager,
        config: &CatalogConfig,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            store,
            assets,
            namespace: TreePath::parse(&config.namespace)?,
            gen_type: config.gen_type.clone(),
            general_code: config.general_code,
            company_id: config.company_id.clone(),
            ids: IdMinter::new(),
        })
    }

    /// The metadata node all records live under.
    pub fn namespace(&self) -> &TreePath {
        &self.namespace
    }

    fn node(&self, id: &CategoryId) -> Result<TreePath, CatalogError> {
        self.namespace.child(id.as_str()).map_err(|_| {
            CatalogError::Validation(format!("category id {id:?} contains forbidden characters"))
        })
    }

    /// Mint an id and persist a new record.
    ///
    /// The name must not be blank; it is stored as entered. An image must
    /// already be uploaded, its download URL is persisted verbatim. When the
    /// record write fails that blob stays behind unreferenced; the caller
    /// keeps the URL and can retry or remove it.
    #[instrument(skip(self, image_url))]
    pub async fn create(
        &self,
        name: &str,
        image_url: Option<String>,
    ) -> Result<Category, CatalogError> {
        validate_name(name)?;

        let id = self.ids.mint().await;
        let category = Category {
            id: id.clone(),
            general_name: name.to_owned(),
            gen_type: self.gen_type.clone(),
            general_code: self.general_code,
            company_id: self.company_id.clone(),
            image_url,
        };

        let record = serde_json::to_value(&category).map_err(MetadataError::from)?;
        self.store.put(&self.node(&id)?, record).await?;

        info!(%id, "Category created");
        Ok(category)
    }

    /// Read one record. Absent records read as `None`.
    pub async fn get(&self, id: &CategoryId) -> Result<Option<Category>, CatalogError> {
        let Some(value) = self.store.get(&self.node(id)?).await? else {
            return Ok(None);
        };
        let category = serde_json::from_value(value).map_err(MetadataError::from)?;
        Ok(Some(category))
    }

    /// Read one record, failing with [`CatalogError::NotFound`] when absent.
    pub async fn require(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        self.get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Rewrite the operator-facing fields of an existing record.
    ///
    /// The merge touches exactly `generalName` and `imageUrl`; the id and
    /// the classification fields keep their stored values. `image_url` of
    /// `None` writes the empty URL, so the record reads back without an
    /// image. The record must already exist.
    #[instrument(skip(self, image_url))]
    pub async fn update(
        &self,
        id: &CategoryId,
        name: &str,
        image_url: Option<String>,
    ) -> Result<(), CatalogError> {
        validate_name(name)?;
        self.require(id).await?;

        let mut patch = Map::new();
        patch.insert("generalName".into(), Value::String(name.to_owned()));
        patch.insert(
            "imageUrl".into(),
            Value::String(image_url.unwrap_or_default()),
        );

        self.store.merge(&self.node(id)?, patch).await?;

        info!(%id, "Category updated");
        Ok(())
    }

    /// Remove a record and the image blob it points at.
    ///
    /// The blob goes first. If its removal fails the record is deleted all
    /// the same and the stranded blob is only logged; a visible record must
    /// not outlive the delete over a blob store hiccup. Returns what was
    /// stored.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        let removed = self.require(id).await?;

        if let Some(url) = &removed.image_url
            && let Err(error) = self.assets.remove(url).await
        {
            warn!(%id, error = %error, "Image removal failed, deleting the record anyway");
        }

        self.store.delete(&self.node(id)?).await?;

        info!(%id, "Category deleted");
        Ok(removed)
    }
}

fn validate_name(name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation(
            "category name must not be blank".into(),
        ));
    }
    Ok(())
}

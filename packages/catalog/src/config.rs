use common::BlobStorageConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Metadata tree node the categories live under.
    pub namespace: String,
    /// Blob store directory image uploads land in.
    pub image_dir: String,
    /// `genType` stamped onto every record at creation.
    pub gen_type: String,
    /// `generalCode` stamped onto every record at creation.
    pub general_code: i64,
    /// `companyID` stamped onto every record at creation.
    pub company_id: String,
    pub storage: BlobStorageConfig,
}

impl CatalogConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("namespace", "FC/GeneralMaster/Product Group")?
            .set_default("image_dir", "category_images")?
            .set_default("gen_type", "Product Group")?
            .set_default("general_code", 0)?
            .set_default("company_id", "FC")?
            .set_default("storage.root", "./data/blobs")?
            .set_default("storage.public_base_url", "http://127.0.0.1:9199/v0/b/catalog/o")?
            .set_default("storage.max_blob_size", 10 * 1024 * 1024)?
            // Load from config/catalog.toml
            .add_source(File::with_name("config/catalog").required(false))
            // Override from environment (e.g., CATALOG__STORAGE__ROOT)
            .add_source(Environment::with_prefix("CATALOG").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            namespace: "FC/GeneralMaster/Product Group".into(),
            image_dir: "category_images".into(),
            gen_type: "Product Group".into(),
            general_code: 0,
            company_id: "FC".into(),
            storage: BlobStorageConfig::default(),
        }
    }
}

use std::path::PathBuf;

use serde::Deserialize;

/// Blob storage configuration shared by every embedder of the store.
#[derive(Debug, Deserialize, Clone)]
pub struct BlobStorageConfig {
    /// Directory blobs are written under. Default: "./data/blobs".
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Base URL minted download links start with.
    /// Default: "http://127.0.0.1:9199/v0/b/catalog/o".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Largest accepted blob in bytes. Default: 10 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
}

fn default_storage_root() -> PathBuf {
    "./data/blobs".into()
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:9199/v0/b/catalog/o".into()
}
fn default_max_blob_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for BlobStorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            public_base_url: default_public_base_url(),
            max_blob_size: default_max_blob_size(),
        }
    }
}

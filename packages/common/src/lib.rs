pub mod config;
pub mod metadata;
pub mod storage;

pub use config::BlobStorageConfig;

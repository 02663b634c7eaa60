use common::metadata::MetadataError;
use common::storage::StorageError;
use thiserror::Error;

use crate::category::CategoryId;

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted category data is not acceptable.
    #[error("invalid category: {0}")]
    Validation(String),

    /// Uploading an image blob failed; no metadata was written.
    #[error("image upload failed: {0}")]
    Upload(#[source] StorageError),

    /// Removing an image blob failed.
    #[error("image removal failed: {0}")]
    Removal(#[source] StorageError),

    /// A metadata store operation failed.
    #[error("metadata operation failed: {0}")]
    Persistence(#[from] MetadataError),

    /// The addressed category does not exist.
    #[error("no category with id {0}")]
    NotFound(CategoryId),
}

use thiserror::Error;

/// Errors that can occur during metadata store operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The tree path is structurally invalid.
    #[error("invalid tree path: {0}")]
    InvalidPath(String),

    /// A value could not be converted to or from its JSON form.
    #[error("metadata serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store dropped the subscription and will send no more snapshots.
    #[error("subscription closed by the store")]
    SubscriptionClosed,

    /// The store backend cannot be reached.
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),
}

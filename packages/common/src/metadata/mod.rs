mod error;
mod subscription;
mod traits;
mod tree;

pub mod memory;

pub use error::MetadataError;
pub use subscription::SubtreeSubscription;
pub use traits::MetadataStore;
pub use tree::TreePath;

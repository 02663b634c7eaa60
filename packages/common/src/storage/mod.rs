mod error;
mod path;
mod traits;

pub mod filesystem;
pub mod memory;

pub use error::StorageError;
pub use path::{BlobPath, download_url, path_from_url};
pub use traits::{BlobStore, BoxReader};

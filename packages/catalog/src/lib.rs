pub mod assets;
pub mod category;
pub mod config;
pub mod error;
pub mod projection;
pub mod repository;
pub mod service;
pub mod session;

pub use category::{Category, CategoryId};
pub use config::CatalogConfig;
pub use error::CatalogError;
pub use projection::CategoryListProjection;
pub use service::CatalogService;
pub use session::{EditSession, SaveOutcome};

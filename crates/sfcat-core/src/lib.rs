pub mod app_config;
pub mod catalog;
pub mod columns;
pub mod config;
pub mod products;

pub use app_config::{AppConfig, Browser};
pub use catalog::{load_catalog, CatalogFile, CollectionConfig};
pub use columns::{Bookkeeping, Cell, BOOKKEEPING, COLUMNS};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{ProductPage, SpecTable, VariantControl, VariantRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

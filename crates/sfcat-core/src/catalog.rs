use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One storefront collection whose listing pages are walked for product links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    /// Collection URL without a `page` query parameter, e.g.
    /// `"https://floorscenter.com/collections/ottimo-tiles"`.
    pub url: String,
    pub notes: Option<String>,
}

impl CollectionConfig {
    /// URL of the `page`-th listing page of this collection.
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        let base = self.url.trim_end_matches('/');
        let sep = if base.contains('?') { '&' } else { '?' };
        format!("{base}{sep}page={page}")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub collections: Vec<CollectionConfig>,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    #[serde(default = "default_end_page")]
    pub end_page: u32,
}

fn default_start_page() -> u32 {
    1
}

fn default_end_page() -> u32 {
    100
}

/// Load and validate the catalog configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogFileParse)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

/// Checks collection names and URLs plus the page range.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first problem found.
pub fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    if catalog.collections.is_empty() {
        return Err(ConfigError::Validation(
            "at least one collection is required".to_string(),
        ));
    }

    if catalog.start_page == 0 {
        return Err(ConfigError::Validation(
            "start_page must be at least 1".to_string(),
        ));
    }

    if catalog.start_page > catalog.end_page {
        return Err(ConfigError::Validation(format!(
            "start_page {} is after end_page {}",
            catalog.start_page, catalog.end_page
        )));
    }

    let mut seen_names = HashSet::new();
    for collection in &catalog.collections {
        if collection.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "collection name must be non-empty".to_string(),
            ));
        }

        let parsed = url::Url::parse(&collection.url).map_err(|e| {
            ConfigError::Validation(format!(
                "collection '{}' has invalid url \"{}\": {e}",
                collection.name, collection.url
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "collection '{}' url must be http(s), got scheme \"{}\"",
                collection.name,
                parsed.scheme()
            )));
        }

        if !seen_names.insert(collection.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate collection name: '{}'",
                collection.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

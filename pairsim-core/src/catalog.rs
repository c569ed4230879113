//! Stimulus catalog files.
//!
//! The authoring tools export `{"products": [...], "metadata": {...}}`; a bare
//! array of products is accepted as well. Entries are validated here so that a
//! broken catalog fails before any session is created.

use crate::stimulus::{StimulusId, StimulusItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog entry {index} has a missing or invalid '{field}'")]
    MalformedEntry { index: usize, field: &'static str },
    #[error("catalog contains duplicate id '{0}'")]
    DuplicateId(StimulusId),
}

/// Provenance block written next to the products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub description_column: Option<String>,
    #[serde(default)]
    pub word_limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped {
        products: Vec<RawProduct>,
        #[serde(default)]
        metadata: Option<CatalogMetadata>,
    },
    Bare(Vec<RawProduct>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<StimulusItem>,
    metadata: Option<CatalogMetadata>,
}

impl Catalog {
    pub fn new(items: Vec<StimulusItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self {
            items,
            metadata: None,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&text)?;
        debug!(path = %path.display(), items = catalog.len(), "loaded stimulus catalog");
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let (raw, metadata) = match serde_json::from_str::<CatalogFile>(text)? {
            CatalogFile::Wrapped { products, metadata } => (products, metadata),
            CatalogFile::Bare(products) => (products, None),
        };

        let items = raw
            .into_iter()
            .enumerate()
            .map(|(index, product)| product.into_item(index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut catalog = Self::new(items)?;
        catalog.metadata = metadata;
        Ok(catalog)
    }

    pub fn items(&self) -> &[StimulusItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<StimulusItem> {
        self.items
    }

    pub fn metadata(&self) -> Option<&CatalogMetadata> {
        self.metadata.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl RawProduct {
    fn into_item(self, index: usize) -> Result<StimulusItem, CatalogError> {
        let missing = |field| CatalogError::MalformedEntry { index, field };

        let id = self
            .id
            .and_then(|id| StimulusId::new(id.trim()).ok())
            .ok_or_else(|| missing("id"))?;
        let name = self.name.ok_or_else(|| missing("name"))?;
        let description = self.description.ok_or_else(|| missing("description"))?;
        let price = self.price.ok_or_else(|| missing("price"))?;
        // exported catalogs name images after the product id
        let image = self.image.unwrap_or_else(|| format!("{id}.png"));

        Ok(StimulusItem::new(id, name, description, price, image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORTED: &str = r#"{
        "products": [
            {"id": "B001", "name": "Pour-over kettle", "description": "Gooseneck.", "price": "$34.99", "image": "B001.png"},
            {"id": "B002", "name": "Burr grinder", "description": "Conical burrs.", "price": "$89.00"}
        ],
        "metadata": {
            "created": "2025-03-02",
            "source": "coffee_top_products.csv",
            "description_column": "coffee-espresso",
            "word_limit": 50
        }
    }"#;

    #[test]
    fn parses_exported_file() {
        let catalog = Catalog::from_json_str(EXPORTED).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].id.as_str(), "B001");
        assert_eq!(catalog.items()[1].image, "B002.png");
        let meta = catalog.metadata().unwrap();
        assert_eq!(meta.word_limit, Some(50));
        assert_eq!(meta.description_column.as_deref(), Some("coffee-espresso"));
    }

    #[test]
    fn parses_bare_array() {
        let catalog = Catalog::from_json_str(
            r#"[{"id": "A", "name": "a", "description": "", "price": "1"}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.metadata().is_none());
    }

    #[test]
    fn missing_field_names_entry() {
        let err = Catalog::from_json_str(
            r#"{"products": [
                {"id": "A", "name": "a", "description": "d", "price": "1"},
                {"id": "B", "name": "b", "price": "2"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedEntry {
                index: 1,
                field: "description"
            }
        ));
    }

    #[test]
    fn blank_id_is_malformed() {
        let err = Catalog::from_json_str(
            r#"[{"id": "  ", "name": "a", "description": "d", "price": "1"}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedEntry {
                index: 0,
                field: "id"
            }
        ));
    }

    #[test]
    fn id_with_pair_key_separator_is_malformed() {
        let err = Catalog::from_json_str(
            r#"[
                {"id": "A", "name": "a", "description": "d", "price": "1"},
                {"id": "A_B", "name": "ab", "description": "d", "price": "1"},
                {"id": "B_C", "name": "bc", "description": "d", "price": "1"},
                {"id": "C", "name": "c", "description": "d", "price": "1"}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedEntry {
                index: 1,
                field: "id"
            }
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::from_json_str(
            r#"[
                {"id": "A", "name": "a", "description": "d", "price": "1"},
                {"id": "A", "name": "again", "description": "d", "price": "1"}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id.as_str() == "A"));
    }

    #[test]
    fn not_json_is_parse_error() {
        assert!(matches!(
            Catalog::from_json_str("products:"),
            Err(CatalogError::Parse(_))
        ));
    }
}

//! Static badge catalog: badge id to image file name.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use shared::validation::is_safe_asset_path;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const BUILTIN_MANIFEST: &str = include_str!("../../assets/badge_catalog.json");

lazy_static! {
    static ref BUILTIN: BadgeCatalog =
        BadgeCatalog::from_json(BUILTIN_MANIFEST).unwrap_or_else(|_| BadgeCatalog::empty());
}

/// Errors raised while loading a catalog manifest.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate badge id in catalog: {0}")]
    DuplicateId(String),

    #[error("Catalog entry has an empty {0}")]
    EmptyField(&'static str),

    #[error("Badge {id} has an invalid image file name: {image}")]
    InvalidImage { id: String, image: String },
}

/// One badge the admin can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCatalogEntry {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "image")]
    pub image_file_name: String,
}

/// Immutable badge lookup table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct BadgeCatalog {
    entries: Vec<BadgeCatalogEntry>,
    index: HashMap<String, usize>,
}

impl BadgeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> &'static BadgeCatalog {
        &BUILTIN
    }

    pub fn from_entries(entries: Vec<BadgeCatalogEntry>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::EmptyField("id"));
            }
            if entry.image_file_name.trim().is_empty() {
                return Err(CatalogError::EmptyField("image"));
            }
            // Image names end up inside CSS url('...') and HTML attributes.
            if !is_safe_asset_path(&entry.image_file_name) {
                return Err(CatalogError::InvalidImage {
                    id: entry.id.clone(),
                    image: entry.image_file_name.clone(),
                });
            }
            if index.insert(entry.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    /// Parses a manifest: a JSON array of `{id, name, image}` records.
    pub fn from_json(manifest: &str) -> Result<Self, CatalogError> {
        let entries: Vec<BadgeCatalogEntry> = serde_json::from_str(manifest)?;
        Self::from_entries(entries)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let manifest = std::fs::read_to_string(path)?;
        Self::from_json(&manifest)
    }

    pub fn lookup(&self, badge_id: &str) -> Option<&BadgeCatalogEntry> {
        self.index.get(badge_id).map(|&i| &self.entries[i])
    }

    /// All entries in manifest order.
    pub fn entries(&self) -> &[BadgeCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

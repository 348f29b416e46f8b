//! Provider catalog: the read-only roster the scoring engine ranks.
//!
//! The catalog is loaded once at startup and shared by reference; it is never
//! mutated afterwards.

mod roster;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::models::Provider;

/// Catalog loading errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error reading catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Duplicate provider name: {0}")]
    DuplicateProvider(String),

    #[error("Provider at position {0} has an empty name")]
    EmptyName(usize),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// On-disk roster layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    providers: Vec<Provider>,
}

/// Immutable, cheaply clonable provider roster.
#[derive(Debug, Clone)]
pub struct Catalog {
    providers: Arc<[Provider]>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or duplicate names (case-insensitive).
    pub fn new(providers: Vec<Provider>) -> CatalogResult<Self> {
        let mut seen = HashSet::new();
        for (idx, provider) in providers.iter().enumerate() {
            let key = provider.name.trim().to_lowercase();
            if key.is_empty() {
                return Err(CatalogError::EmptyName(idx));
            }
            if !seen.insert(key) {
                return Err(CatalogError::DuplicateProvider(provider.name.clone()));
            }
        }
        Ok(Self {
            providers: providers.into(),
        })
    }

    /// The built-in roster.
    pub fn builtin() -> Self {
        Self {
            providers: roster::builtin_providers().into(),
        }
    }

    /// Parse a roster from TOML (`[[providers]]` tables).
    pub fn from_toml_str(source: &str) -> CatalogResult<Self> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::new(file.providers)
    }

    /// Load a roster file.
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Providers in catalog order.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Case-insensitive lookup by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&Provider> {
        let needle = name.trim().to_lowercase();
        self.providers
            .iter()
            .find(|p| p.name.trim().to_lowercase() == needle)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

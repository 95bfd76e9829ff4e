//! Directory of partner shops known to the marketplace.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    pub id: String,
}

/// On-disk shape: `{"shops": [{"name": ..., "id": ...}]}`.
#[derive(Debug, Deserialize)]
struct ShopsFile {
    #[serde(default)]
    shops: Vec<Shop>,
}

#[derive(Debug, Error)]
pub enum ShopsError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shops keyed by id. A later entry with the same id wins.
#[derive(Debug, Clone, Default)]
pub struct ShopDirectory {
    shops: HashMap<String, Shop>,
}

impl ShopDirectory {
    pub fn new(shops: impl IntoIterator<Item = Shop>) -> Self {
        Self {
            shops: shops.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    /// Parses a directory from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, ShopsError> {
        let file: ShopsFile = serde_json::from_str(json)?;
        Ok(Self::new(file.shops))
    }

    /// Reads and parses the directory at `path`.
    pub fn load(path: &Path) -> Result<Self, ShopsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: &str) -> Option<&Shop> {
        self.shops.get(id)
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }
}

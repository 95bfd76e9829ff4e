//! Product identifiers and their store of origin.

use serde::{Deserialize, Serialize};

use crate::error::ProductIdError;

/// Store id reserved for this system's own catalog.
pub const DEFAULT_INTERNAL_STORE_ID: &str = "ONBQ";

/// Product identifier of the form `<store_id>:<local_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the id on the first `:` into `(store_id, local_id)`.
    pub fn split(&self) -> Result<(&str, &str), ProductIdError> {
        self.0
            .split_once(':')
            .ok_or_else(|| ProductIdError::Malformed(self.0.clone()))
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where a product is sold from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductOrigin {
    /// Listed in this system's own catalog.
    Internal,
    /// Listed by a third-party marketplace store.
    External { store_id: String },
}

impl ProductOrigin {
    pub fn is_external(&self) -> bool {
        matches!(self, ProductOrigin::External { .. })
    }
}

/// Classifies product ids by their store prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginResolver {
    internal_store_id: String,
}

impl OriginResolver {
    /// Creates a resolver treating `internal_store_id` as the internal catalog.
    pub fn new(internal_store_id: impl Into<String>) -> Self {
        Self {
            internal_store_id: internal_store_id.into(),
        }
    }

    pub fn internal_store_id(&self) -> &str {
        &self.internal_store_id
    }

    /// Resolves the origin of `product_id`.
    pub fn resolve(&self, product_id: &ProductId) -> Result<ProductOrigin, ProductIdError> {
        let (store_id, _local_id) = product_id.split()?;
        if store_id == self.internal_store_id {
            Ok(ProductOrigin::Internal)
        } else {
            Ok(ProductOrigin::External {
                store_id: store_id.to_string(),
            })
        }
    }

    /// True if `product_id` resolves to an external store.
    ///
    /// Malformed ids are never considered external.
    pub fn is_external(&self, product_id: &ProductId) -> bool {
        self.resolve(product_id)
            .map(|origin| origin.is_external())
            .unwrap_or(false)
    }
}

impl Default for OriginResolver {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNAL_STORE_ID)
    }
}

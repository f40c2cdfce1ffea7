use serde::{Deserialize, Serialize};

use crate::id::ProductId;

/// Catalog view of a product: the identity fields forecasts and scans are reported against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    /// Code printed on the item; what the vision detector recognizes.
    pub sku: String,
}

impl CatalogProduct {
    pub fn new(id: ProductId, name: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sku: sku.into(),
        }
    }
}

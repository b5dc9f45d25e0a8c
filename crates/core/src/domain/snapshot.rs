use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

/// Point-in-time read of the catalog plus per-product units sold within the
/// lookback window. A snapshot is a value, not a live cursor: it does not
/// reflect writes committed after it was taken.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub taken_at: DateTime<Utc>,
    pub window_days: i64,
    pub products: Vec<Product>,
    pub units_sold: HashMap<ProductId, i64>,
}

impl InventorySnapshot {
    pub fn new(
        taken_at: DateTime<Utc>,
        window_days: i64,
        products: Vec<Product>,
        units_sold: HashMap<ProductId, i64>,
    ) -> Self {
        Self { taken_at, window_days, products, units_sold }
    }

    pub fn units_sold_for(&self, id: &ProductId) -> i64 {
        self.units_sold.get(id).copied().unwrap_or(0)
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

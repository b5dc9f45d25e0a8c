use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self(format!("prod-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog entry. `price >= cost_price` is expected but not enforced here;
/// margin reports non-positive when a caller violates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    /// Free text, used as a lookup key into category-specific seasonal and
    /// shelf-life tables.
    pub category: String,
    pub quantity: i64,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub supplier_id: i64,
    /// Minimum stock before replenishment is triggered.
    pub reorder_level: i64,
    /// Optional catalog data; only the expiry report consumes it.
    pub expiry_date: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }

    pub fn inventory_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.cost_price
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{Product, ProductId};

    fn product(quantity: i64, reorder_level: i64) -> Product {
        Product {
            id: ProductId("prod-milk".to_string()),
            name: "Milk 1L".to_string(),
            sku: "MLK-001".to_string(),
            category: "Dairy".to_string(),
            quantity,
            price: Decimal::new(6500, 2),
            cost_price: Decimal::new(5000, 2),
            supplier_id: 2,
            reorder_level,
            expiry_date: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let first = ProductId::generate();
        let second = ProductId::generate();
        assert!(first.0.starts_with("prod-"));
        assert_ne!(first, second);
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        assert!(product(10, 10).is_low_stock());
        assert!(!product(11, 10).is_low_stock());
    }

    #[test]
    fn inventory_value_uses_cost_price() {
        assert_eq!(product(4, 10).inventory_value(), Decimal::new(20000, 2));
    }
}

//! Daily-demand estimation strategies.
//!
//! Scenario authors choose an estimator deliberately: the stock heuristic
//! reproduces the 5%-of-quantity rule, while the historical estimator
//! averages real completed-order volume over the snapshot window.

use crate::domain::product::Product;
use crate::domain::snapshot::InventorySnapshot;

/// Percent of current stock assumed to sell per day by the heuristic.
const STOCK_DEMAND_RATE_PCT: i64 = 5;

pub trait DemandEstimator: Send + Sync {
    /// Estimated units sold per day, always at least 1.
    fn daily_demand(&self, product: &Product, snapshot: &InventorySnapshot) -> i64;
}

/// `max(1, quantity * 5%)` — no history required.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicFromStock;

impl DemandEstimator for HeuristicFromStock {
    fn daily_demand(&self, product: &Product, _snapshot: &InventorySnapshot) -> i64 {
        (product.quantity * STOCK_DEMAND_RATE_PCT / 100).max(1)
    }
}

/// Units sold in the snapshot window divided by window length. Falls back
/// to [`HeuristicFromStock`] when the window recorded no sales.
#[derive(Clone, Copy, Debug, Default)]
pub struct HistoricalAverage;

impl DemandEstimator for HistoricalAverage {
    fn daily_demand(&self, product: &Product, snapshot: &InventorySnapshot) -> i64 {
        let sold = snapshot.units_sold_for(&product.id);
        if sold <= 0 {
            return HeuristicFromStock.daily_demand(product, snapshot);
        }
        (sold / snapshot.window_days.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{DemandEstimator, HeuristicFromStock, HistoricalAverage};
    use crate::domain::product::{Product, ProductId};
    use crate::domain::snapshot::InventorySnapshot;

    fn product(quantity: i64) -> Product {
        Product {
            id: ProductId("prod-rice".to_string()),
            name: "Rice 5kg".to_string(),
            sku: "RCE-005".to_string(),
            category: "Staples".to_string(),
            quantity,
            price: Decimal::from(450),
            cost_price: Decimal::from(380),
            supplier_id: 1,
            reorder_level: 15,
            expiry_date: None,
            last_updated: Utc::now(),
        }
    }

    fn snapshot(products: Vec<Product>, units_sold: HashMap<ProductId, i64>) -> InventorySnapshot {
        InventorySnapshot::new(Utc::now(), 30, products, units_sold)
    }

    #[test]
    fn heuristic_floors_small_stock_at_one_unit_per_day() {
        let product = product(8);
        let snapshot = snapshot(vec![product.clone()], HashMap::new());
        assert_eq!(HeuristicFromStock.daily_demand(&product, &snapshot), 1);
    }

    #[test]
    fn heuristic_takes_five_percent_of_larger_stock() {
        let product = product(200);
        let snapshot = snapshot(vec![product.clone()], HashMap::new());
        assert_eq!(HeuristicFromStock.daily_demand(&product, &snapshot), 10);
    }

    #[test]
    fn heuristic_ignores_negative_stock() {
        let product = product(-40);
        let snapshot = snapshot(vec![product.clone()], HashMap::new());
        assert_eq!(HeuristicFromStock.daily_demand(&product, &snapshot), 1);
    }

    #[test]
    fn historical_average_uses_window_sales() {
        let product = product(200);
        let mut units_sold = HashMap::new();
        units_sold.insert(product.id.clone(), 90);
        let snapshot = snapshot(vec![product.clone()], units_sold);
        assert_eq!(HistoricalAverage.daily_demand(&product, &snapshot), 3);
    }

    #[test]
    fn historical_average_falls_back_without_sales() {
        let product = product(200);
        let snapshot = snapshot(vec![product.clone()], HashMap::new());
        assert_eq!(HistoricalAverage.daily_demand(&product, &snapshot), 10);
    }
}

//! Expiry exposure over synthetic batches with category shelf-life
//! heuristics.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ScenarioError, Stat};
use crate::analytics::recommendation::{recommendation, RecommendationInput};
use crate::domain::product::{Product, ProductId};
use crate::domain::snapshot::InventorySnapshot;
use crate::domain::store::StoreContext;

const MAX_BATCHES: i64 = 5;
const CRITICAL_DAYS: i64 = 7;
const WARNING_DAYS: i64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Good,
    Warning,
    Critical,
}

impl BatchStatus {
    pub fn from_days(days_until_expiry: i64) -> Self {
        if days_until_expiry > WARNING_DAYS {
            Self::Good
        } else if days_until_expiry > CRITICAL_DAYS {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Synthetic sub-division of a product's stock; exists only within one
/// scenario invocation and is never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    pub status: BatchStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpiryProduct {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub total_quantity: i64,
    pub batches: Vec<Batch>,
    pub total_value: Decimal,
    pub value_at_risk: Decimal,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpiryAnalysis {
    pub title: String,
    pub description: String,
    pub products: Vec<ExpiryProduct>,
    pub stats: Vec<Stat>,
}

/// Shelf life in days for batch `index`, keyed by category: dairy turns
/// fastest, confectionery slowest.
fn shelf_life_days(category: &str, index: i64) -> i64 {
    match category {
        "Dairy" => 14 + index * 7,
        "Confectionery" => 180 + index * 30,
        _ => 90 + index * 14,
    }
}

fn batches_for(product: &Product, today: NaiveDate) -> Vec<Batch> {
    let batch_count = (product.quantity / 5).clamp(1, MAX_BATCHES);

    let mut batches = Vec::with_capacity(batch_count as usize);
    let mut remaining = product.quantity.max(0);
    for index in 0..batch_count {
        let batch_size = remaining / (batch_count - index);
        remaining -= batch_size;

        let days_until_expiry = shelf_life_days(&product.category, index);
        batches.push(Batch {
            batch_id: format!("BT-{}-{}", product.id, index + 1),
            quantity: batch_size,
            expiry_date: today + Duration::days(days_until_expiry),
            days_until_expiry,
            status: BatchStatus::from_days(days_until_expiry),
        });
    }
    batches
}

/// Splits each product into synthetic expiry batches and totals the value
/// at risk within the warning window. Output is sorted by value at risk,
/// highest first.
pub fn run_expiry(
    snapshot: &InventorySnapshot,
    context: &StoreContext,
) -> Result<ExpiryAnalysis, ScenarioError> {
    let today = snapshot.taken_at.date_naive();

    let mut products = Vec::with_capacity(snapshot.products.len());
    for product in &snapshot.products {
        let batches = batches_for(product, today);

        let total_value: Decimal = batches
            .iter()
            .map(|batch| Decimal::from(batch.quantity) * product.cost_price)
            .sum();
        let value_at_risk: Decimal = batches
            .iter()
            .filter(|batch| batch.days_until_expiry <= WARNING_DAYS)
            .map(|batch| Decimal::from(batch.quantity) * product.cost_price)
            .sum();

        let critical_batches =
            batches.iter().filter(|batch| batch.status == BatchStatus::Critical).count();
        let warning_batches =
            batches.iter().filter(|batch| batch.status == BatchStatus::Warning).count();

        products.push(ExpiryProduct {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            total_quantity: product.quantity,
            batches,
            total_value: total_value.round_dp(2),
            value_at_risk: value_at_risk.round_dp(2),
            recommendation: recommendation(RecommendationInput::Expiry {
                critical_batches,
                warning_batches,
            }),
        });
    }

    products.sort_by(|left, right| right.value_at_risk.cmp(&left.value_at_risk));

    let critical_total: usize = products
        .iter()
        .map(|row| row.batches.iter().filter(|b| b.status == BatchStatus::Critical).count())
        .sum();
    let warning_total: usize = products
        .iter()
        .map(|row| row.batches.iter().filter(|b| b.status == BatchStatus::Warning).count())
        .sum();
    let value_at_risk_total: Decimal = products.iter().map(|row| row.value_at_risk).sum();
    let stats = vec![
        Stat::new("Products Analyzed", products.len()),
        Stat::new("Critical Batches", critical_total),
        Stat::new("Warning Batches", warning_total),
        Stat::new(
            "Total Value at Risk",
            format!("{}{}", context.currency_symbol, value_at_risk_total.round_dp(2)),
        ),
    ];

    Ok(ExpiryAnalysis {
        title: format!("Expiry Tracking Analysis - {}", context.store_name),
        description: "Tracks product expiration dates and suggests actions to minimize waste."
            .to_string(),
        products,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{run_expiry, BatchStatus};
    use crate::domain::product::{Product, ProductId};
    use crate::domain::snapshot::InventorySnapshot;
    use crate::domain::store::StoreContext;

    fn product(id: &str, category: &str, quantity: i64, cost: Decimal) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            sku: format!("SKU-{id}"),
            category: category.to_string(),
            quantity,
            price: cost * Decimal::from(2),
            cost_price: cost,
            supplier_id: 1,
            reorder_level: 10,
            expiry_date: None,
            last_updated: Utc::now(),
        }
    }

    fn snapshot(products: Vec<Product>) -> InventorySnapshot {
        InventorySnapshot::new(Utc::now(), 30, products, HashMap::new())
    }

    #[test]
    fn batch_count_is_bounded_one_to_five() {
        let snapshot = snapshot(vec![
            product("tiny", "Dairy", 3, Decimal::from(10)),
            product("large", "Dairy", 200, Decimal::from(10)),
        ]);
        let analysis = run_expiry(&snapshot, &StoreContext::default()).expect("run");

        assert_eq!(analysis.products.iter().find(|p| p.name == "tiny").unwrap().batches.len(), 1);
        assert_eq!(analysis.products.iter().find(|p| p.name == "large").unwrap().batches.len(), 5);
    }

    #[test]
    fn batch_sizes_sum_to_total_quantity() {
        let snapshot = snapshot(vec![product("milk", "Dairy", 23, Decimal::from(10))]);
        let analysis = run_expiry(&snapshot, &StoreContext::default()).expect("run");

        let row = &analysis.products[0];
        let total: i64 = row.batches.iter().map(|batch| batch.quantity).sum();
        assert_eq!(total, 23);
    }

    #[test]
    fn dairy_first_batch_sits_in_the_warning_window() {
        let snapshot = snapshot(vec![product("milk", "Dairy", 30, Decimal::from(10))]);
        let analysis = run_expiry(&snapshot, &StoreContext::default()).expect("run");

        let row = &analysis.products[0];
        assert_eq!(row.batches[0].days_until_expiry, 14);
        assert_eq!(row.batches[0].status, BatchStatus::Warning);
        assert!(row.value_at_risk > Decimal::ZERO);
        assert!(row.recommendation.starts_with("Monitor closely"));
    }

    #[test]
    fn confectionery_carries_no_value_at_risk() {
        let snapshot = snapshot(vec![product("toffee", "Confectionery", 30, Decimal::from(10))]);
        let analysis = run_expiry(&snapshot, &StoreContext::default()).expect("run");

        let row = &analysis.products[0];
        assert_eq!(row.value_at_risk, Decimal::ZERO);
        assert_eq!(row.recommendation, "All batches have good shelf life remaining.");
    }

    #[test]
    fn products_sort_by_value_at_risk_descending() {
        let snapshot = snapshot(vec![
            product("toffee", "Confectionery", 30, Decimal::from(10)),
            product("milk", "Dairy", 30, Decimal::from(10)),
        ]);
        let analysis = run_expiry(&snapshot, &StoreContext::default()).expect("run");

        assert_eq!(analysis.products[0].name, "milk");
    }
}

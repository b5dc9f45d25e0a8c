//! Reorder timing and order sizing per product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ScenarioError, Stat};
use crate::analytics::demand::DemandEstimator;
use crate::analytics::metrics::{annual_inventory_cost, eoq, reorder_point};
use crate::analytics::recommendation::{recommendation, RecommendationInput};
use crate::domain::product::ProductId;
use crate::domain::snapshot::InventorySnapshot;
use crate::domain::store::StoreContext;

/// Supplier lead time in days: a 3-5 day spread keyed off the supplier id.
fn lead_time_for_supplier(supplier_id: i64) -> i64 {
    3 + supplier_id.rem_euclid(3)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReorderingProduct {
    pub product_id: ProductId,
    pub name: String,
    pub current_quantity: i64,
    pub daily_sales: i64,
    pub lead_time_days: i64,
    pub eoq: i64,
    pub reorder_point: i64,
    pub current_reorder_level: i64,
    pub days_until_reorder: i64,
    pub order_cycle_days: i64,
    pub total_annual_cost: Decimal,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReorderingAnalysis {
    pub title: String,
    pub description: String,
    pub currency_symbol: String,
    pub products: Vec<ReorderingProduct>,
    pub stats: Vec<Stat>,
}

/// Computes order size, reorder point, and reorder timing for every
/// product. Output is sorted most urgent first (ascending days until
/// reorder, stable within ties).
pub fn run_reordering(
    snapshot: &InventorySnapshot,
    context: &StoreContext,
    estimator: &dyn DemandEstimator,
) -> Result<ReorderingAnalysis, ScenarioError> {
    let mut products = Vec::with_capacity(snapshot.products.len());
    for product in &snapshot.products {
        let daily_sales = estimator.daily_demand(product, snapshot);
        let lead_time_days = lead_time_for_supplier(product.supplier_id);
        let order_quantity = eoq(daily_sales, lead_time_days, product.cost_price);
        // The configured reorder level doubles as safety stock on top of
        // lead-time demand.
        let point = reorder_point(daily_sales, lead_time_days, product.reorder_level.max(0));
        let days_until_reorder = ((product.quantity - point) / daily_sales).max(0);
        let order_cycle_days = if daily_sales > 0 { order_quantity / daily_sales } else { 0 };

        products.push(ReorderingProduct {
            product_id: product.id.clone(),
            name: product.name.clone(),
            current_quantity: product.quantity,
            daily_sales,
            lead_time_days,
            eoq: order_quantity,
            reorder_point: point,
            current_reorder_level: product.reorder_level,
            days_until_reorder,
            order_cycle_days,
            total_annual_cost: annual_inventory_cost(daily_sales, order_quantity, product.cost_price),
            recommendation: recommendation(RecommendationInput::Reorder {
                quantity: product.quantity,
                reorder_point: point,
                eoq: order_quantity,
                days_until_reorder,
            }),
        });
    }

    products.sort_by_key(|row| row.days_until_reorder);

    let below_reorder_point =
        products.iter().filter(|row| row.current_quantity <= row.reorder_point).count();
    let recommended_units: i64 = products
        .iter()
        .filter(|row| row.current_quantity <= row.reorder_point)
        .map(|row| row.eoq)
        .sum();
    let average_days = if products.is_empty() {
        0.0
    } else {
        let total: i64 = products.iter().map(|row| row.days_until_reorder).sum();
        (total as f64 * 10.0 / products.len() as f64).round() / 10.0
    };
    let stats = vec![
        Stat::new("Products Analyzed", products.len()),
        Stat::new("Below Reorder Point", below_reorder_point),
        Stat::new("Recommended Order Units", recommended_units),
        Stat::new("Average Days Until Reorder", average_days),
    ];

    Ok(ReorderingAnalysis {
        title: "Reordering Analysis".to_string(),
        description: "Optimizes reordering strategies to minimize costs while preventing stockouts."
            .to_string(),
        currency_symbol: context.currency_symbol.clone(),
        products,
        stats,
    })
}

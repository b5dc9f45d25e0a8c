//! Stockout risk classification from estimated daily demand.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{ScenarioError, Stat};
use crate::analytics::demand::DemandEstimator;
use crate::analytics::metrics::{risk_level, RiskLevel, STOCKOUT_RISK_HORIZON_DAYS};
use crate::analytics::recommendation::{recommendation, RecommendationInput};
use crate::domain::product::ProductId;
use crate::domain::snapshot::InventorySnapshot;
use crate::domain::store::StoreContext;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockoutProduct {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub current_quantity: i64,
    pub daily_sales_avg: i64,
    pub days_until_stockout: i64,
    pub stockout_date: NaiveDate,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockoutAnalysis {
    pub title: String,
    pub description: String,
    pub products: Vec<StockoutProduct>,
    pub stats: Vec<Stat>,
}

/// Classifies every product's days of cover against the stockout horizon.
/// Output is sorted High risk first; products within the same tier keep
/// their catalog order.
pub fn run_stockout(
    snapshot: &InventorySnapshot,
    context: &StoreContext,
    estimator: &dyn DemandEstimator,
) -> Result<StockoutAnalysis, ScenarioError> {
    let today = snapshot.taken_at.date_naive();

    let mut products = Vec::with_capacity(snapshot.products.len());
    for product in &snapshot.products {
        let daily_sales_avg = estimator.daily_demand(product, snapshot);
        let days_until_stockout = product.quantity / daily_sales_avg;
        let stockout_date = today + Duration::days(days_until_stockout);
        let risk = risk_level(days_until_stockout, STOCKOUT_RISK_HORIZON_DAYS);

        products.push(StockoutProduct {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            current_quantity: product.quantity,
            daily_sales_avg,
            days_until_stockout,
            stockout_date,
            risk_level: risk,
            recommendation: recommendation(RecommendationInput::Urgency(risk == RiskLevel::High)),
        });
    }

    // Stable sort: preserves catalog order inside each tier.
    products.sort_by_key(|row| row.risk_level.rank());

    let count_for = |tier: RiskLevel| products.iter().filter(|row| row.risk_level == tier).count();
    let average_days = if products.is_empty() {
        0.0
    } else {
        let total: i64 = products.iter().map(|row| row.days_until_stockout).sum();
        (total as f64 * 10.0 / products.len() as f64).round() / 10.0
    };
    let stats = vec![
        Stat::new("High Risk", count_for(RiskLevel::High)),
        Stat::new("Medium Risk", count_for(RiskLevel::Medium)),
        Stat::new("Low Risk", count_for(RiskLevel::Low)),
        Stat::new("Average Days Left", average_days),
    ];

    Ok(StockoutAnalysis {
        title: format!("Stockout Risk Analysis - {}", context.store_name),
        description: "Analyzes the risk of stock outages based on current inventory levels and estimated demand."
            .to_string(),
        products,
        stats,
    })
}

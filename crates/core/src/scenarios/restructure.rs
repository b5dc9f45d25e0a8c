//! Category-level capital allocation against turnover.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ScenarioError, Stat};
use crate::analytics::recommendation::{recommendation, RecommendationInput};
use crate::domain::product::{Product, ProductId};
use crate::domain::snapshot::InventorySnapshot;
use crate::domain::store::StoreContext;

/// Reallocation is only recommended past this percentage-point gap.
pub const REALLOCATION_THRESHOLD_PCT: f64 = 10.0;

const TURNOVER_HIGH: f64 = 6.0;
const TURNOVER_MEDIUM: f64 = 4.0;
const TURNOVER_LOW: f64 = 2.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryProduct {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub cost_price: Decimal,
    pub inventory_value: Decimal,
    pub turnover: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub products: Vec<CategoryProduct>,
    pub total_value: Decimal,
    pub avg_turnover: f64,
    /// Share of total inventory value currently tied up in this category.
    pub capital_allocation: f64,
    /// Share this category would receive if capital followed turnover.
    pub optimal_allocation: f64,
    pub allocation_difference: f64,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestructureAnalysis {
    pub title: String,
    pub description: String,
    pub categories: BTreeMap<String, CategoryAllocation>,
    pub total_inventory_value: Decimal,
    pub stats: Vec<Stat>,
}

/// Stock-to-reorder-level proxy for how fast a product turns: at or below
/// the reorder level counts as high turnover, within twice the level as
/// medium, anything deeper as slow-moving.
fn turnover_for(product: &Product) -> f64 {
    if product.quantity <= product.reorder_level {
        TURNOVER_HIGH
    } else if product.quantity <= product.reorder_level * 2 {
        TURNOVER_MEDIUM
    } else {
        TURNOVER_LOW
    }
}

/// Groups the catalog by category and compares each category's share of
/// capital to the share its turnover would justify. Both allocation columns
/// sum to 100 (within float rounding) whenever total value and turnover are
/// positive.
pub fn run_restructure(
    snapshot: &InventorySnapshot,
    context: &StoreContext,
) -> Result<RestructureAnalysis, ScenarioError> {
    let mut grouped: BTreeMap<String, Vec<CategoryProduct>> = BTreeMap::new();
    for product in &snapshot.products {
        grouped.entry(product.category.clone()).or_default().push(CategoryProduct {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity: product.quantity,
            cost_price: product.cost_price,
            inventory_value: product.inventory_value(),
            turnover: turnover_for(product),
        });
    }

    let total_inventory_value: Decimal = grouped
        .values()
        .flat_map(|products| products.iter().map(|product| product.inventory_value))
        .sum();

    let mut categories: BTreeMap<String, CategoryAllocation> = BTreeMap::new();
    for (category, mut products) in grouped {
        products.sort_by(|left, right| {
            right.turnover.partial_cmp(&left.turnover).unwrap_or(std::cmp::Ordering::Equal)
        });

        let total_value: Decimal = products.iter().map(|product| product.inventory_value).sum();
        let avg_turnover =
            products.iter().map(|product| product.turnover).sum::<f64>() / products.len() as f64;
        let capital_allocation = if total_inventory_value > Decimal::ZERO {
            (total_value / total_inventory_value * Decimal::from(100)).to_f64().unwrap_or(0.0)
        } else {
            0.0
        };

        categories.insert(
            category,
            CategoryAllocation {
                products,
                total_value,
                avg_turnover,
                capital_allocation,
                optimal_allocation: 0.0,
                allocation_difference: 0.0,
                recommendation: String::new(),
            },
        );
    }

    let total_turnover: f64 =
        categories.values().map(|allocation| allocation.avg_turnover).sum();
    for allocation in categories.values_mut() {
        allocation.optimal_allocation = if total_turnover > 0.0 {
            allocation.avg_turnover / total_turnover * 100.0
        } else {
            0.0
        };
        allocation.allocation_difference =
            allocation.optimal_allocation - allocation.capital_allocation;
        allocation.recommendation = recommendation(RecommendationInput::Urgency(
            allocation.allocation_difference.abs() > REALLOCATION_THRESHOLD_PCT,
        ));
    }

    let largest_gap = categories
        .values()
        .map(|allocation| allocation.allocation_difference.abs())
        .fold(0.0_f64, f64::max);
    let stats = vec![
        Stat::new("Categories", categories.len()),
        Stat::new(
            "Total Inventory Value",
            format!("{}{}", context.currency_symbol, total_inventory_value.round_dp(2)),
        ),
        Stat::new("Largest Reallocation Gap %", (largest_gap * 10.0).round() / 10.0),
    ];

    Ok(RestructureAnalysis {
        title: format!("Inventory Restructuring Analysis - {}", context.store_name),
        description: "Analyzes current inventory allocation and suggests restructuring to optimize capital allocation."
            .to_string(),
        categories,
        total_inventory_value,
        stats,
    })
}

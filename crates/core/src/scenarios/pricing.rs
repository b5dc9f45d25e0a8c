//! Price optimization over a fixed grid of candidate multipliers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ScenarioError, Stat};
use crate::analytics::metrics::margin;
use crate::analytics::recommendation::{recommendation, RecommendationInput};
use crate::domain::product::ProductId;
use crate::domain::snapshot::InventorySnapshot;
use crate::domain::store::StoreContext;

/// Candidate price multipliers, evaluated in ascending order. Ties on
/// profit keep the first (lowest) candidate.
const PRICE_MULTIPLIERS: [(i64, u32); 5] = [(90, 2), (95, 2), (100, 2), (105, 2), (110, 2)];

/// Elasticity proxy: estimated sell-through scales as `1.15 - multiplier`.
const ELASTICITY_INTERCEPT: (i64, u32) = (115, 2);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: Decimal,
    pub estimated_quantity: i64,
    pub margin: Decimal,
    pub profit: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingProduct {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub current_price: Decimal,
    pub cost_price: Decimal,
    pub current_margin: Decimal,
    pub price_points: Vec<PricePoint>,
    pub optimal_price: Decimal,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingAnalysis {
    pub title: String,
    pub description: String,
    pub currency_symbol: String,
    pub products: Vec<PricingProduct>,
    pub stats: Vec<Stat>,
}

/// Evaluates five price points around the current price per product and
/// picks the profit-maximizing one. Output preserves catalog order.
pub fn run_pricing(
    snapshot: &InventorySnapshot,
    context: &StoreContext,
) -> Result<PricingAnalysis, ScenarioError> {
    let intercept = Decimal::new(ELASTICITY_INTERCEPT.0, ELASTICITY_INTERCEPT.1);

    let mut products = Vec::with_capacity(snapshot.products.len());
    for product in &snapshot.products {
        let mut price_points = Vec::with_capacity(PRICE_MULTIPLIERS.len());
        let mut optimal_price = product.price;
        let mut max_profit = Decimal::ZERO;

        for (num, scale) in PRICE_MULTIPLIERS {
            let multiplier = Decimal::new(num, scale);
            let test_price = (product.price * multiplier).round_dp(2);
            let quantity_factor = intercept - multiplier;
            let estimated_quantity = (Decimal::from(product.quantity) * quantity_factor)
                .trunc()
                .to_i64()
                .unwrap_or(0);
            let profit =
                ((test_price - product.cost_price) * Decimal::from(estimated_quantity)).round_dp(2);

            price_points.push(PricePoint {
                price: test_price,
                estimated_quantity,
                margin: margin(test_price, product.cost_price),
                profit,
            });

            // Strict improvement only, so equal-profit candidates resolve
            // to the lowest multiplier.
            if profit > max_profit {
                max_profit = profit;
                optimal_price = test_price;
            }
        }

        products.push(PricingProduct {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            current_price: product.price,
            cost_price: product.cost_price,
            current_margin: margin(product.price, product.cost_price),
            price_points,
            optimal_price,
            recommendation: recommendation(RecommendationInput::Pricing {
                current_price: product.price,
                optimal_price,
                currency_symbol: &context.currency_symbol,
            }),
        });
    }

    let increases =
        products.iter().filter(|row| row.optimal_price > row.current_price).count();
    let decreases =
        products.iter().filter(|row| row.optimal_price < row.current_price).count();
    let average_margin = if products.is_empty() {
        Decimal::ZERO
    } else {
        (products.iter().map(|row| row.current_margin).sum::<Decimal>()
            / Decimal::from(products.len() as i64))
        .round_dp(2)
    };
    let stats = vec![
        Stat::new("Products Analyzed", products.len()),
        Stat::new("Price Increases Suggested", increases),
        Stat::new("Price Decreases Suggested", decreases),
        Stat::new("Average Current Margin %", average_margin),
    ];

    Ok(PricingAnalysis {
        title: "Pricing Optimization Analysis".to_string(),
        description: "Analyzes current pricing strategies and suggests optimizations to maximize profitability."
            .to_string(),
        currency_symbol: context.currency_symbol.clone(),
        products,
        stats,
    })
}

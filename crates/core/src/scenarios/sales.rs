//! Synthetic sales-trend analysis.
//!
//! Intentionally stochastic: weekly volumes wobble inside a bounded band
//! around a stock-derived average. The randomness source is injected so
//! production runs vary while tests can pin a seed.

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ScenarioError, Stat};
use crate::analytics::recommendation::{recommendation, RecommendationInput};
use crate::domain::product::ProductId;
use crate::domain::snapshot::InventorySnapshot;
use crate::domain::store::StoreContext;

const TIME_PERIOD_WEEKS: usize = 12;

/// Weekly demand wobble band: factor drawn uniformly from [0.7, 1.3).
const FACTOR_BASE: f64 = 0.7;
const FACTOR_SPREAD: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStatus {
    StrongGrowth,
    ModerateGrowth,
    Stable,
    Declining,
}

impl TrendStatus {
    pub fn from_trend_percent(trend: f64) -> Self {
        if trend > 10.0 {
            Self::StrongGrowth
        } else if trend > 0.0 {
            Self::ModerateGrowth
        } else if trend > -10.0 {
            Self::Stable
        } else {
            Self::Declining
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongGrowth => "Strong Growth",
            Self::ModerateGrowth => "Moderate Growth",
            Self::Stable => "Stable",
            Self::Declining => "Declining",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklySale {
    pub week: usize,
    pub quantity: i64,
    pub revenue: Decimal,
    pub profit: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesProduct {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub weekly_sales: Vec<WeeklySale>,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_quantity: i64,
    pub trend_percent: f64,
    pub trend_status: TrendStatus,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesAnalysis {
    pub title: String,
    pub description: String,
    pub currency_symbol: String,
    pub products: Vec<SalesProduct>,
    pub stats: Vec<Stat>,
}

/// Generates a 12-week synthetic series per product and buckets the
/// first-half/second-half revenue trend. Output is sorted by total
/// revenue, highest first.
pub fn run_sales<R: Rng + ?Sized>(
    snapshot: &InventorySnapshot,
    context: &StoreContext,
    rng: &mut R,
) -> Result<SalesAnalysis, ScenarioError> {
    let mut products = Vec::with_capacity(snapshot.products.len());
    for product in &snapshot.products {
        let avg_weekly_sales = (product.quantity / 10).max(1);

        let mut weekly_sales = Vec::with_capacity(TIME_PERIOD_WEEKS);
        for week in 0..TIME_PERIOD_WEEKS {
            let factor = FACTOR_BASE + rng.gen::<f64>() * FACTOR_SPREAD;
            let quantity = (avg_weekly_sales as f64 * factor) as i64;
            let revenue = (product.price * Decimal::from(quantity)).round_dp(2);
            let profit =
                ((product.price - product.cost_price) * Decimal::from(quantity)).round_dp(2);

            weekly_sales.push(WeeklySale { week: week + 1, quantity, revenue, profit });
        }

        let total_revenue: Decimal = weekly_sales.iter().map(|week| week.revenue).sum();
        let total_profit: Decimal = weekly_sales.iter().map(|week| week.profit).sum();
        let total_quantity: i64 = weekly_sales.iter().map(|week| week.quantity).sum();

        let half = TIME_PERIOD_WEEKS / 2;
        let first_half: Decimal = weekly_sales[..half].iter().map(|week| week.revenue).sum();
        let second_half: Decimal = weekly_sales[half..].iter().map(|week| week.revenue).sum();
        let trend_percent = if first_half > Decimal::ZERO {
            ((second_half - first_half) / first_half * Decimal::from(100))
                .round_dp(1)
                .to_f64()
                .unwrap_or(0.0)
        } else {
            0.0
        };
        let trend_status = TrendStatus::from_trend_percent(trend_percent);

        products.push(SalesProduct {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            weekly_sales,
            total_revenue,
            total_profit,
            total_quantity,
            trend_percent,
            trend_status,
            recommendation: recommendation(RecommendationInput::Urgency(
                trend_status != TrendStatus::Stable,
            )),
        });
    }

    products.sort_by(|left, right| right.total_revenue.cmp(&left.total_revenue));

    let total_revenue: Decimal = products.iter().map(|row| row.total_revenue).sum();
    let total_units: i64 = products.iter().map(|row| row.total_quantity).sum();
    let growing = products.iter().filter(|row| row.trend_percent > 0.0).count();
    let declining =
        products.iter().filter(|row| row.trend_status == TrendStatus::Declining).count();
    let stats = vec![
        Stat::new(
            "Total Revenue",
            format!("{}{}", context.currency_symbol, total_revenue.round_dp(2)),
        ),
        Stat::new("Total Units", total_units),
        Stat::new("Growing Products", growing),
        Stat::new("Declining Products", declining),
    ];

    Ok(SalesAnalysis {
        title: "Sales Analytics".to_string(),
        description: "Analyzes sales patterns and provides revenue optimization insights."
            .to_string(),
        currency_symbol: context.currency_symbol.clone(),
        products,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;

    use super::{run_sales, TrendStatus};
    use crate::domain::product::{Product, ProductId};
    use crate::domain::snapshot::InventorySnapshot;
    use crate::domain::store::StoreContext;

    fn product(id: &str, quantity: i64) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            sku: format!("SKU-{id}"),
            category: "Staples".to_string(),
            quantity,
            price: Decimal::from(100),
            cost_price: Decimal::from(70),
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
    fn trend_buckets_follow_the_ten_percent_thresholds() {
        assert_eq!(TrendStatus::from_trend_percent(10.1), TrendStatus::StrongGrowth);
        assert_eq!(TrendStatus::from_trend_percent(10.0), TrendStatus::ModerateGrowth);
        assert_eq!(TrendStatus::from_trend_percent(0.0), TrendStatus::Stable);
        assert_eq!(TrendStatus::from_trend_percent(-10.0), TrendStatus::Declining);
    }

    #[test]
    fn series_has_twelve_weeks_inside_the_wobble_band() {
        let snapshot = snapshot(vec![product("rice", 240)]);
        let mut rng = StdRng::seed_from_u64(7);
        let analysis = run_sales(&snapshot, &StoreContext::default(), &mut rng).expect("run");

        let row = &analysis.products[0];
        assert_eq!(row.weekly_sales.len(), 12);
        for week in &row.weekly_sales {
            // avg 24/week, factor in [0.7, 1.3): quantity in [16, 31].
            assert!(week.quantity >= 16, "week {} below floor", week.week);
            assert!(week.quantity <= 31, "week {} above ceiling", week.week);
            assert_eq!(week.revenue, Decimal::from(week.quantity * 100));
        }
        assert_eq!(row.total_quantity, row.weekly_sales.iter().map(|w| w.quantity).sum::<i64>());
    }

    #[test]
    fn identical_seeds_produce_identical_series() {
        let snapshot = snapshot(vec![product("rice", 240), product("salt", 60)]);

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let run_a = run_sales(&snapshot, &StoreContext::default(), &mut rng_a).expect("a");
        let run_b = run_sales(&snapshot, &StoreContext::default(), &mut rng_b).expect("b");

        assert_eq!(run_a, run_b);
    }

    #[test]
    fn higher_revenue_product_sorts_first() {
        let snapshot = snapshot(vec![product("small", 20), product("big", 1000)]);
        let mut rng = StdRng::seed_from_u64(3);
        let analysis = run_sales(&snapshot, &StoreContext::default(), &mut rng).expect("run");

        assert_eq!(analysis.products[0].name, "big");
        assert!(analysis.products[0].total_revenue >= analysis.products[1].total_revenue);
    }
}

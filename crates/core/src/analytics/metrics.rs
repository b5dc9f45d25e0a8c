//! Stateless numeric primitives shared by the scenario algorithms.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed cost assumed per order event, in store currency units.
pub const ORDERING_COST: i64 = 50;

/// Annual holding cost as a fraction of unit cost: 25%.
pub const HOLDING_COST_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Day threshold the stockout scenario classifies days-of-cover against.
pub const STOCKOUT_RISK_HORIZON_DAYS: i64 = 14;

/// Floor for the holding-cost denominator when a product carries a zero or
/// negative unit cost.
const MIN_HOLDING_COST: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Sort key: High before Medium before Low.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gross margin percent, rounded to two decimals. Returns 0 when `price`
/// is zero rather than dividing by it.
pub fn margin(price: Decimal, cost_price: Decimal) -> Decimal {
    if price.is_zero() {
        return Decimal::ZERO;
    }
    ((price - cost_price) / price * Decimal::from(100)).round_dp(2)
}

/// Simplified economic order quantity. Demand is annualized and balanced
/// against [`ORDERING_COST`] and a holding cost of [`HOLDING_COST_RATE`] of
/// unit cost, then floored at the demand covered during lead time so a
/// recommended order never undershoots the replenishment window.
pub fn eoq(daily_demand: i64, lead_time_days: i64, unit_cost: Decimal) -> i64 {
    if daily_demand <= 0 {
        return 0;
    }

    let annual_demand = (daily_demand * 365) as f64;
    let holding = (unit_cost * HOLDING_COST_RATE).to_f64().unwrap_or(0.0);
    let holding = if holding > 0.0 { holding } else { MIN_HOLDING_COST };
    let balanced = ((2.0 * annual_demand * ORDERING_COST as f64) / holding).sqrt();

    let lead_time_demand = daily_demand * lead_time_days.max(0);
    (balanced.floor() as i64).max(lead_time_demand).max(1)
}

/// Inventory level at which a new order should be placed.
pub fn reorder_point(daily_demand: i64, lead_time_days: i64, safety_stock: i64) -> i64 {
    (daily_demand * lead_time_days + safety_stock).max(0)
}

/// Canonical three-tier risk classification. `value` is scenario-specific
/// (days of cover for stockout, stock quantity elsewhere); `threshold` is
/// the matching horizon (day threshold or reorder level). Degenerate inputs
/// (non-positive threshold, negative value) classify as Low rather than
/// raising.
pub fn risk_level(value: i64, threshold: i64) -> RiskLevel {
    if threshold <= 0 || value < 0 {
        return RiskLevel::Low;
    }

    let ratio = value as f64 / threshold as f64;
    if ratio <= 0.5 {
        RiskLevel::High
    } else if ratio <= 1.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Total annual inventory cost for a given order size: ordering cost on the
/// number of order events per year plus holding cost on the average stock
/// held. Rounded to two decimals.
pub fn annual_inventory_cost(daily_demand: i64, order_quantity: i64, unit_cost: Decimal) -> Decimal {
    if order_quantity <= 0 {
        return Decimal::ZERO;
    }

    let annual_demand = Decimal::from(daily_demand * 365);
    let ordering = annual_demand / Decimal::from(order_quantity) * Decimal::from(ORDERING_COST);
    let holding = Decimal::from(order_quantity) / Decimal::from(2) * (unit_cost * HOLDING_COST_RATE);
    (ordering + holding).round_dp(2)
}

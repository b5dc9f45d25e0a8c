//! Translates scenario recommendations into committed per-product state
//! changes.
//!
//! Each planned adjustment is applied as its own atomic write keyed by
//! product identity. There is no cross-product transaction: if the loop is
//! interrupted partway, the report names exactly which products were
//! mutated and which were not.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockwise_core::domain::product::ProductId;
use stockwise_core::domain::snapshot::InventorySnapshot;
use stockwise_core::scenarios::restructure::REALLOCATION_THRESHOLD_PCT;
use stockwise_core::scenarios::{ScenarioOutcome, TrendStatus};
use stockwise_core::RiskLevel;
use stockwise_db::ProductRepository;

/// Price moves below this fraction of the current price are suppressed to
/// avoid churn.
const PRICE_CHANGE_THRESHOLD: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannedAction {
    AdjustQuantity { delta: i64 },
    SetPrice { value: Decimal },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedAdjustment {
    pub product_id: ProductId,
    pub product_name: String,
    pub action: PlannedAction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    pub product_id: ProductId,
    pub product_name: String,
    pub action: PlannedAction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailedAdjustment {
    pub product_id: ProductId,
    pub product_name: String,
    pub action: PlannedAction,
    pub reason: String,
}

/// Outcome of one apply pass. `failed` non-empty means partial
/// application: earlier products in the plan were already committed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub applied: Vec<AppliedAdjustment>,
    pub failed: Vec<FailedAdjustment>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

fn scaled(quantity: i64, factor: Decimal) -> i64 {
    (Decimal::from(quantity) * factor).trunc().to_i64().unwrap_or(0)
}

fn quantity_change(
    product_id: &ProductId,
    product_name: &str,
    current: i64,
    target: i64,
) -> Option<PlannedAdjustment> {
    let delta = target - current;
    (delta != 0).then(|| PlannedAdjustment {
        product_id: product_id.clone(),
        product_name: product_name.to_string(),
        action: PlannedAction::AdjustQuantity { delta },
    })
}

/// Derives the concrete state changes a scenario authorizes. The snapshot
/// is the same one the scenario computed over, so targets are derived from
/// the quantities the recommendations were based on.
pub fn plan_adjustments(
    outcome: &ScenarioOutcome,
    snapshot: &InventorySnapshot,
) -> Vec<PlannedAdjustment> {
    let reorder_level_of = |id: &ProductId| -> i64 {
        snapshot.product(id).map(|product| product.reorder_level).unwrap_or(0)
    };

    let mut plan = Vec::new();
    match outcome {
        ScenarioOutcome::Seasonal(analysis) => {
            for row in &analysis.products {
                let factor = row.seasonal_factors.factor(row.current_season);
                let quantity = row.current_quantity;
                let target = if factor < Decimal::ONE {
                    // Low season: shed stock, but never below the reorder
                    // level.
                    reorder_level_of(&row.product_id).max(scaled(quantity, Decimal::new(8, 1)))
                } else if factor > Decimal::ONE {
                    scaled(quantity, Decimal::new(12, 1))
                } else {
                    quantity
                };
                plan.extend(quantity_change(&row.product_id, &row.name, quantity, target));
            }
        }
        ScenarioOutcome::Stockout(analysis) => {
            for row in &analysis.products {
                if row.risk_level != RiskLevel::High {
                    continue;
                }
                let delta = (reorder_level_of(&row.product_id) - row.current_quantity).max(0);
                if delta > 0 {
                    plan.push(PlannedAdjustment {
                        product_id: row.product_id.clone(),
                        product_name: row.name.clone(),
                        action: PlannedAction::AdjustQuantity { delta },
                    });
                }
            }
        }
        ScenarioOutcome::Pricing(analysis) => {
            for row in &analysis.products {
                let denominator = if row.current_price.is_zero() {
                    Decimal::ONE
                } else {
                    row.current_price
                };
                let shift = ((row.optimal_price - row.current_price) / denominator).abs();
                if shift > PRICE_CHANGE_THRESHOLD {
                    plan.push(PlannedAdjustment {
                        product_id: row.product_id.clone(),
                        product_name: row.name.clone(),
                        action: PlannedAction::SetPrice { value: row.optimal_price },
                    });
                }
            }
        }
        ScenarioOutcome::Reordering(analysis) => {
            for row in &analysis.products {
                if row.current_quantity <= row.reorder_point && row.eoq > 0 {
                    plan.push(PlannedAdjustment {
                        product_id: row.product_id.clone(),
                        product_name: row.name.clone(),
                        action: PlannedAction::AdjustQuantity { delta: row.eoq },
                    });
                }
            }
        }
        ScenarioOutcome::Expiry(analysis) => {
            for row in &analysis.products {
                if row.value_at_risk <= Decimal::ZERO {
                    continue;
                }
                let quantity = row.total_quantity;
                let target =
                    reorder_level_of(&row.product_id).max(scaled(quantity, Decimal::new(7, 1)));
                plan.extend(quantity_change(&row.product_id, &row.name, quantity, target));
            }
        }
        ScenarioOutcome::Sales(analysis) => {
            for row in &analysis.products {
                let quantity = snapshot
                    .product(&row.product_id)
                    .map(|product| product.quantity)
                    .unwrap_or(0);
                let target = match row.trend_status {
                    TrendStatus::StrongGrowth => scaled(quantity, Decimal::new(13, 1)),
                    TrendStatus::Declining => {
                        reorder_level_of(&row.product_id).max(scaled(quantity, Decimal::new(7, 1)))
                    }
                    TrendStatus::ModerateGrowth | TrendStatus::Stable => continue,
                };
                plan.extend(quantity_change(&row.product_id, &row.name, quantity, target));
            }
        }
        ScenarioOutcome::Restructure(analysis) => {
            for allocation in analysis.categories.values() {
                if allocation.allocation_difference.abs() <= REALLOCATION_THRESHOLD_PCT {
                    continue;
                }
                for row in &allocation.products {
                    let target = scaled(row.quantity, Decimal::new(12, 1));
                    plan.extend(quantity_change(&row.product_id, &row.name, row.quantity, target));
                }
            }
        }
    }

    plan
}

/// Walks a plan and commits each adjustment through the repository, one
/// atomic write per product. Failures are collected, never propagated, so
/// one corrupt product cannot abort the rest of the batch.
pub struct MutationApplier {
    products: Arc<dyn ProductRepository>,
}

impl MutationApplier {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn apply(&self, plan: &[PlannedAdjustment]) -> ApplyReport {
        let mut report = ApplyReport::default();

        for adjustment in plan {
            let result = match &adjustment.action {
                PlannedAction::AdjustQuantity { delta } => {
                    self.products.adjust_quantity(&adjustment.product_id, *delta).await
                }
                PlannedAction::SetPrice { value } => {
                    self.products.set_price(&adjustment.product_id, *value).await
                }
            };

            match result {
                Ok(()) => report.applied.push(AppliedAdjustment {
                    product_id: adjustment.product_id.clone(),
                    product_name: adjustment.product_name.clone(),
                    action: adjustment.action.clone(),
                }),
                Err(error) => {
                    tracing::warn!(
                        product_id = %adjustment.product_id,
                        error = %error,
                        "failed to apply adjustment"
                    );
                    report.failed.push(FailedAdjustment {
                        product_id: adjustment.product_id.clone(),
                        product_name: adjustment.product_name.clone(),
                        action: adjustment.action.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        report
    }
}

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use stockwise_core::domain::store::StoreContext;
use stockwise_core::errors::{ApplicationError, DomainError};
use stockwise_core::scenarios::{
    run_expiry, run_pricing, run_reordering, run_restructure, run_sales, run_seasonal,
    run_stockout, ScenarioError, ScenarioKind, ScenarioOutcome,
};
use stockwise_core::{DemandEstimator, HeuristicFromStock};
use stockwise_db::{OrderRepository, ProductRepository};

use crate::applier::{plan_adjustments, ApplyReport, MutationApplier, PlannedAdjustment};
use crate::snapshot::SnapshotReader;

const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Whether a run commits its recommendations back to the catalog or only
/// reports what it would change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    Commit,
    DryRun,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub outcome: ScenarioOutcome,
    pub planned: Vec<PlannedAdjustment>,
    pub adjustments: ApplyReport,
}

/// Structured result contract: internal failures and unknown tags come
/// back as an error variant, never a panic or a leaked storage error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationRunResult {
    Completed(SimulationRun),
    Error { message: String },
}

pub struct SimulationEngine {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    store: StoreContext,
    estimator: Arc<dyn DemandEstimator>,
    lookback_days: i64,
    sales_rng_seed: Option<u64>,
}

impl SimulationEngine {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        store: StoreContext,
    ) -> Self {
        Self {
            products,
            orders,
            store,
            estimator: Arc::new(HeuristicFromStock),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            sales_rng_seed: None,
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Swaps the daily-demand strategy used by the stockout and reordering
    /// scenarios.
    pub fn with_demand_estimator(mut self, estimator: Arc<dyn DemandEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Pins the sales scenario's randomness. Production leaves this unset.
    pub fn with_sales_rng_seed(mut self, seed: u64) -> Self {
        self.sales_rng_seed = Some(seed);
        self
    }

    /// Runs one scenario to completion. `Commit` applies the per-product
    /// adjustments the scenario authorizes; `DryRun` only plans them.
    pub async fn run_simulation(&self, scenario: &str, mode: ApplyMode) -> SimulationRunResult {
        let kind = match scenario.parse::<ScenarioKind>() {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(requested = scenario, "rejected unknown simulation type");
                return SimulationRunResult::Error {
                    message: "Unknown simulation type".to_string(),
                };
            }
        };

        match self.execute(kind, mode).await {
            Ok(run) => SimulationRunResult::Completed(run),
            Err(error) => {
                tracing::error!(scenario = kind.as_str(), error = %error, "simulation failed");
                SimulationRunResult::Error { message: error.user_message() }
            }
        }
    }

    async fn execute(
        &self,
        kind: ScenarioKind,
        mode: ApplyMode,
    ) -> Result<SimulationRun, ApplicationError> {
        let reader = SnapshotReader::new(self.products.clone(), self.orders.clone());
        let snapshot = reader.load(self.lookback_days).await?;

        tracing::info!(
            scenario = kind.as_str(),
            products = snapshot.products.len(),
            "running simulation"
        );

        let outcome = match kind {
            ScenarioKind::Seasonal => {
                ScenarioOutcome::Seasonal(run_seasonal(&snapshot, &self.store).map_err(lift)?)
            }
            ScenarioKind::Stockout => ScenarioOutcome::Stockout(
                run_stockout(&snapshot, &self.store, &*self.estimator).map_err(lift)?,
            ),
            ScenarioKind::Pricing => {
                ScenarioOutcome::Pricing(run_pricing(&snapshot, &self.store).map_err(lift)?)
            }
            ScenarioKind::Reordering => ScenarioOutcome::Reordering(
                run_reordering(&snapshot, &self.store, &*self.estimator).map_err(lift)?,
            ),
            ScenarioKind::Expiry => {
                ScenarioOutcome::Expiry(run_expiry(&snapshot, &self.store).map_err(lift)?)
            }
            ScenarioKind::Sales => {
                let mut rng = self.sales_rng();
                ScenarioOutcome::Sales(run_sales(&snapshot, &self.store, &mut rng).map_err(lift)?)
            }
            ScenarioKind::Restructure => {
                ScenarioOutcome::Restructure(run_restructure(&snapshot, &self.store).map_err(lift)?)
            }
        };

        let planned = plan_adjustments(&outcome, &snapshot);
        let adjustments = match mode {
            ApplyMode::Commit => {
                let applier = MutationApplier::new(self.products.clone());
                let report = applier.apply(&planned).await;
                tracing::info!(
                    scenario = kind.as_str(),
                    applied = report.applied.len(),
                    failed = report.failed.len(),
                    "simulation adjustments committed"
                );
                report
            }
            ApplyMode::DryRun => ApplyReport::default(),
        };

        Ok(SimulationRun { outcome, planned, adjustments })
    }

    fn sales_rng(&self) -> StdRng {
        match self.sales_rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn lift(error: ScenarioError) -> ApplicationError {
    ApplicationError::Domain(DomainError::InvariantViolation(error.to_string()))
}

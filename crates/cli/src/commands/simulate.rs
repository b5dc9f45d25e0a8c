use std::sync::Arc;

use stockwise_core::config::DemandEstimatorKind;
use stockwise_core::{HeuristicFromStock, HistoricalAverage};
use stockwise_engine::{ApplyMode, SimulationEngine, SimulationRunResult};

use crate::commands::{repositories, store_context, with_connection, CommandResult};

pub fn run(scenario: &str, dry_run: bool) -> CommandResult {
    let scenario = scenario.to_string();
    let result = with_connection("simulate", |config, pool| async move {
        let (products, orders) = repositories(&pool);
        let mut engine = SimulationEngine::new(products, orders, store_context(&config))
            .with_lookback_days(config.simulation.lookback_days);
        engine = match config.simulation.demand_estimator {
            DemandEstimatorKind::Heuristic => {
                engine.with_demand_estimator(Arc::new(HeuristicFromStock))
            }
            DemandEstimatorKind::Historical => {
                engine.with_demand_estimator(Arc::new(HistoricalAverage))
            }
        };
        if let Some(seed) = config.simulation.sales_rng_seed {
            engine = engine.with_sales_rng_seed(seed);
        }

        let mode = if dry_run { ApplyMode::DryRun } else { ApplyMode::Commit };
        match engine.run_simulation(&scenario, mode).await {
            SimulationRunResult::Completed(run) => Ok((run, dry_run)),
            SimulationRunResult::Error { message } => Err(("simulation", message, 5u8)),
        }
    });

    match result {
        Ok((run, dry_run)) => {
            let stats = run
                .outcome
                .stats()
                .iter()
                .map(|stat| format!("{}: {}", stat.label, stat.value))
                .collect::<Vec<_>>()
                .join("; ");
            let message = if dry_run {
                format!(
                    "{} (dry run): {} adjustments planned. {}",
                    run.outcome.title(),
                    run.planned.len(),
                    stats
                )
            } else {
                format!(
                    "{}: {} adjustments applied, {} failed. {}",
                    run.outcome.title(),
                    run.adjustments.applied.len(),
                    run.adjustments.failed.len(),
                    stats
                )
            };
            CommandResult::success("simulate", message)
        }
        Err(failure) => failure,
    }
}

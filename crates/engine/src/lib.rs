//! Simulation & reorder decision engine: reads inventory state through the
//! repository seams, runs the scenario algorithms, and (when asked)
//! commits the resulting per-product adjustments.

pub mod applier;
pub mod reports;
pub mod runner;
pub mod snapshot;
pub mod stats;

pub use applier::{
    plan_adjustments, AppliedAdjustment, ApplyReport, FailedAdjustment, MutationApplier,
    PlannedAction, PlannedAdjustment,
};
pub use reports::{ReportAggregator, ReportDataset, ReportOutput, ReportPeriod, ReportSeries};
pub use runner::{ApplyMode, SimulationEngine, SimulationRun, SimulationRunResult};
pub use snapshot::SnapshotReader;
pub use stats::{InventoryStats, StatsReader};

use stockwise_core::errors::ApplicationError;
use stockwise_db::RepositoryError;

pub(crate) fn persistence_error(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

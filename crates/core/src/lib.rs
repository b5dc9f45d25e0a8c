pub mod analytics;
pub mod config;
pub mod domain;
pub mod errors;
pub mod scenarios;

pub use chrono;

pub use analytics::demand::{DemandEstimator, HeuristicFromStock, HistoricalAverage};
pub use analytics::metrics::{eoq, margin, reorder_point, risk_level, RiskLevel};
pub use analytics::recommendation::{recommendation, RecommendationInput};
pub use domain::order::{Order, OrderId, OrderItem, OrderStatus, SoldLine};
pub use domain::product::{Product, ProductId};
pub use domain::snapshot::InventorySnapshot;
pub use domain::store::StoreContext;
pub use errors::{ApplicationError, DomainError};
pub use scenarios::{ScenarioError, ScenarioKind, ScenarioOutcome, Stat};

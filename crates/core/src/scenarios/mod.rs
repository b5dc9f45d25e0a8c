//! The seven what-if scenario algorithms.
//!
//! Each algorithm is a pure function over an [`InventorySnapshot`] and a
//! [`StoreContext`]: no I/O, no hidden clock (time comes from the
//! snapshot), and randomness only where it is injected explicitly (sales).
//! Outputs are one variant per scenario so callers match on concrete
//! result shapes instead of probing loose maps.
//!
//! [`InventorySnapshot`]: crate::domain::snapshot::InventorySnapshot
//! [`StoreContext`]: crate::domain::store::StoreContext

pub mod expiry;
pub mod pricing;
pub mod reordering;
pub mod restructure;
pub mod sales;
pub mod seasonal;
pub mod stockout;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::DomainError;

pub use expiry::{run_expiry, Batch, BatchStatus, ExpiryAnalysis, ExpiryProduct};
pub use pricing::{run_pricing, PricePoint, PricingAnalysis, PricingProduct};
pub use reordering::{run_reordering, ReorderingAnalysis, ReorderingProduct};
pub use restructure::{
    run_restructure, CategoryAllocation, CategoryProduct, RestructureAnalysis,
};
pub use sales::{run_sales, SalesAnalysis, SalesProduct, TrendStatus, WeeklySale};
pub use seasonal::{run_seasonal, Season, SeasonalAnalysis, SeasonalFactors, SeasonalProduct};
pub use stockout::{run_stockout, StockoutAnalysis, StockoutProduct};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Seasonal,
    Stockout,
    Pricing,
    Reordering,
    Expiry,
    Sales,
    Restructure,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 7] = [
        Self::Seasonal,
        Self::Stockout,
        Self::Pricing,
        Self::Reordering,
        Self::Expiry,
        Self::Sales,
        Self::Restructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seasonal => "seasonal",
            Self::Stockout => "stockout",
            Self::Pricing => "pricing",
            Self::Reordering => "reordering",
            Self::Expiry => "expiry",
            Self::Sales => "sales",
            Self::Restructure => "restructure",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "seasonal" => Some(Self::Seasonal),
            "stockout" => Some(Self::Stockout),
            "pricing" => Some(Self::Pricing),
            "reordering" => Some(Self::Reordering),
            "expiry" => Some(Self::Expiry),
            "sales" => Some(Self::Sales),
            "restructure" => Some(Self::Restructure),
            _ => None,
        }
    }
}

impl std::str::FromStr for ScenarioKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
            .ok_or_else(|| DomainError::UnknownScenario { requested: value.to_string() })
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline figure attached to a scenario result for display surfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

impl Stat {
    pub fn new(label: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Self { label: label.into(), value: value.to_string() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("malformed product {name}: {reason}")]
    MalformedProduct { name: String, reason: String },
}

/// Tagged scenario result: one variant per scenario so the shapes stay
/// distinct at compile time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Seasonal(SeasonalAnalysis),
    Stockout(StockoutAnalysis),
    Pricing(PricingAnalysis),
    Reordering(ReorderingAnalysis),
    Expiry(ExpiryAnalysis),
    Sales(SalesAnalysis),
    Restructure(RestructureAnalysis),
}

impl ScenarioOutcome {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Self::Seasonal(_) => ScenarioKind::Seasonal,
            Self::Stockout(_) => ScenarioKind::Stockout,
            Self::Pricing(_) => ScenarioKind::Pricing,
            Self::Reordering(_) => ScenarioKind::Reordering,
            Self::Expiry(_) => ScenarioKind::Expiry,
            Self::Sales(_) => ScenarioKind::Sales,
            Self::Restructure(_) => ScenarioKind::Restructure,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Seasonal(analysis) => &analysis.title,
            Self::Stockout(analysis) => &analysis.title,
            Self::Pricing(analysis) => &analysis.title,
            Self::Reordering(analysis) => &analysis.title,
            Self::Expiry(analysis) => &analysis.title,
            Self::Sales(analysis) => &analysis.title,
            Self::Restructure(analysis) => &analysis.title,
        }
    }

    pub fn stats(&self) -> &[Stat] {
        match self {
            Self::Seasonal(analysis) => &analysis.stats,
            Self::Stockout(analysis) => &analysis.stats,
            Self::Pricing(analysis) => &analysis.stats,
            Self::Reordering(analysis) => &analysis.stats,
            Self::Expiry(analysis) => &analysis.stats,
            Self::Sales(analysis) => &analysis.stats,
            Self::Restructure(analysis) => &analysis.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScenarioKind;
    use crate::errors::DomainError;

    #[test]
    fn all_seven_tags_round_trip() {
        for kind in ScenarioKind::ALL {
            assert_eq!(ScenarioKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_tag_is_a_domain_error() {
        let error = "weather".parse::<ScenarioKind>().expect_err("must reject");
        assert_eq!(error, DomainError::UnknownScenario { requested: "weather".to_string() });
    }
}

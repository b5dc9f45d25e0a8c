//! Seasonal demand projection from category-keyed multiplier tables.

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ScenarioError, Stat};
use crate::domain::product::ProductId;
use crate::domain::snapshot::InventorySnapshot;
use crate::domain::store::StoreContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

pub const SEASONS: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

impl Season {
    /// `month % 4` proxy rather than calendar-accurate seasons; the
    /// category multiplier tables are keyed to this mapping.
    pub fn from_month(month: u32) -> Season {
        SEASONS[(month % 4) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Demand multipliers per season for one product category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactors {
    pub winter: Decimal,
    pub spring: Decimal,
    pub summer: Decimal,
    pub fall: Decimal,
}

impl SeasonalFactors {
    fn flat() -> Self {
        Self {
            winter: Decimal::ONE,
            spring: Decimal::ONE,
            summer: Decimal::ONE,
            fall: Decimal::ONE,
        }
    }

    pub fn for_category(category: &str) -> Self {
        match category {
            "Confectionery" => Self {
                winter: Decimal::new(14, 1),
                spring: Decimal::new(9, 1),
                summer: Decimal::new(7, 1),
                fall: Decimal::new(12, 1),
            },
            "Staples" => Self {
                winter: Decimal::new(12, 1),
                spring: Decimal::new(8, 1),
                summer: Decimal::new(9, 1),
                fall: Decimal::new(11, 1),
            },
            "Dairy" => Self {
                winter: Decimal::new(8, 1),
                spring: Decimal::new(12, 1),
                summer: Decimal::new(13, 1),
                fall: Decimal::new(9, 1),
            },
            // Essentials and unrecognized categories are season-flat.
            _ => Self::flat(),
        }
    }

    pub fn factor(&self, season: Season) -> Decimal {
        match season {
            Season::Winter => self.winter,
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Fall => self.fall,
        }
    }

    /// Season with the highest multiplier; ties resolve to the earliest
    /// season in [`SEASONS`] order.
    pub fn peak(&self) -> Season {
        let mut peak = Season::Winter;
        for season in SEASONS {
            if self.factor(season) > self.factor(peak) {
                peak = season;
            }
        }
        peak
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedQuantities {
    pub winter: i64,
    pub spring: i64,
    pub summer: i64,
    pub fall: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProduct {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub current_quantity: i64,
    pub current_season: Season,
    pub peak_season: Season,
    pub seasonal_factors: SeasonalFactors,
    pub projected_quantities: ProjectedQuantities,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAnalysis {
    pub title: String,
    pub description: String,
    pub current_season: Season,
    pub products: Vec<SeasonalProduct>,
    pub stats: Vec<Stat>,
}

fn project(quantity: i64, factor: Decimal) -> i64 {
    (Decimal::from(quantity) * factor).trunc().to_i64().unwrap_or(0)
}

/// Projects per-season demand for every product. Output preserves catalog
/// order.
pub fn run_seasonal(
    snapshot: &InventorySnapshot,
    context: &StoreContext,
) -> Result<SeasonalAnalysis, ScenarioError> {
    let current_season = Season::from_month(snapshot.taken_at.date_naive().month());

    let mut products = Vec::with_capacity(snapshot.products.len());
    for product in &snapshot.products {
        let factors = SeasonalFactors::for_category(&product.category);
        let peak_season = factors.peak();
        let current_factor = factors.factor(current_season);

        let projected_quantities = ProjectedQuantities {
            winter: project(product.quantity, factors.winter),
            spring: project(product.quantity, factors.spring),
            summer: project(product.quantity, factors.summer),
            fall: project(product.quantity, factors.fall),
        };

        let direction = if current_factor < Decimal::ONE { "Increase" } else { "Decrease" };
        let recommendation = format!("{direction} inventory before {peak_season}");

        products.push(SeasonalProduct {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            current_quantity: product.quantity,
            current_season,
            peak_season,
            seasonal_factors: factors,
            projected_quantities,
            recommendation,
        });
    }

    let low_season = products
        .iter()
        .filter(|row| row.seasonal_factors.factor(row.current_season) < Decimal::ONE)
        .count();
    let high_season = products
        .iter()
        .filter(|row| row.seasonal_factors.factor(row.current_season) > Decimal::ONE)
        .count();
    let stats = vec![
        Stat::new("Products Analyzed", products.len()),
        Stat::new("Current Season", current_season),
        Stat::new("Low-Season Products", low_season),
        Stat::new("High-Season Products", high_season),
    ];

    Ok(SeasonalAnalysis {
        title: format!("Seasonal Demand Analysis - {}", context.store_name),
        description:
            "Predicts seasonal inventory demand fluctuations based on historical patterns."
                .to_string(),
        current_season,
        products,
        stats,
    })
}

//! Deterministic recommendation text synthesis. No I/O, no randomness:
//! identical inputs always produce identical strings.

use rust_decimal::Decimal;

/// Materiality threshold under which a price move is not worth suggesting.
const PRICE_MATERIALITY: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

#[derive(Clone, Debug, PartialEq)]
pub enum RecommendationInput<'a> {
    Reorder { quantity: i64, reorder_point: i64, eoq: i64, days_until_reorder: i64 },
    Pricing { current_price: Decimal, optimal_price: Decimal, currency_symbol: &'a str },
    Expiry { critical_batches: usize, warning_batches: usize },
    Urgency(bool),
}

pub fn recommendation(input: RecommendationInput<'_>) -> String {
    match input {
        RecommendationInput::Reorder { quantity, reorder_point, eoq, days_until_reorder } => {
            if quantity <= reorder_point {
                format!("Reorder now: place an order for {eoq} units immediately.")
            } else {
                format!("No action needed. Reorder {eoq} units in {days_until_reorder} days.")
            }
        }
        RecommendationInput::Pricing { current_price, optimal_price, currency_symbol } => {
            let denominator = if current_price.is_zero() { Decimal::ONE } else { current_price };
            let shift = ((optimal_price - current_price) / denominator).abs();
            if shift <= PRICE_MATERIALITY {
                "The current price is already optimal.".to_string()
            } else if optimal_price > current_price {
                format!(
                    "Consider increasing price to {currency_symbol}{:.2} to maximize profit.",
                    optimal_price
                )
            } else {
                format!(
                    "Consider decreasing price to {currency_symbol}{:.2} to increase volume and profit.",
                    optimal_price
                )
            }
        }
        RecommendationInput::Expiry { critical_batches, warning_batches } => {
            if critical_batches > 0 {
                format!(
                    "Immediate action required: {critical_batches} batches expiring within 7 days."
                )
            } else if warning_batches > 0 {
                format!("Monitor closely: {warning_batches} batches expiring within 30 days.")
            } else {
                "All batches have good shelf life remaining.".to_string()
            }
        }
        RecommendationInput::Urgency(urgent) => {
            if urgent {
                "Urgent action recommended.".to_string()
            } else {
                "No immediate action required.".to_string()
            }
        }
    }
}

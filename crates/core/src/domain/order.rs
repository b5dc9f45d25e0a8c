use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn generate() -> Self {
        Self(format!("ord-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Customer or supplier order header. `total_amount` is derived from the
/// items at creation time only; it is not kept in sync afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub counterparty: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
}

/// Line item. `unit_price` is the price at the time of the order, not a
/// live reference to the current product price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl Order {
    pub fn total_from_items(items: &[OrderItem]) -> Decimal {
        items.iter().map(|item| item.unit_price * Decimal::from(item.quantity)).sum()
    }
}

/// Read model for time-bucketed sales aggregation: one completed-order line
/// with its order date attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoldLine {
    pub product_id: ProductId,
    pub order_date: DateTime<Utc>,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl SoldLine {
    pub fn revenue(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Order, OrderId, OrderItem, OrderStatus};
    use crate::domain::product::ProductId;

    #[test]
    fn status_round_trips_case_insensitively() {
        assert_eq!(OrderStatus::parse("completed"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse(" Pending "), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::Cancelled.as_str(), "Cancelled");
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let first = OrderId::generate();
        let second = OrderId::generate();
        assert!(first.0.starts_with("ord-"));
        assert_ne!(first, second);
    }

    #[test]
    fn order_total_sums_line_amounts() {
        let order_id = OrderId("ord-1".to_string());
        let items = vec![
            OrderItem {
                order_id: order_id.clone(),
                product_id: ProductId("prod-a".to_string()),
                quantity: 3,
                unit_price: Decimal::new(1000, 2),
            },
            OrderItem {
                order_id,
                product_id: ProductId("prod-b".to_string()),
                quantity: 2,
                unit_price: Decimal::new(250, 2),
            },
        ];

        assert_eq!(Order::total_from_items(&items), Decimal::new(3500, 2));
    }
}

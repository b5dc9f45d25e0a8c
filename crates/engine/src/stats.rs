use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockwise_core::errors::ApplicationError;
use stockwise_db::{OrderRepository, ProductRepository};

use crate::persistence_error;

/// Turnover never displays below this floor.
const MIN_TURNOVER_RATE: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_items: i64,
    /// Products at or below their reorder level.
    pub low_stock_count: i64,
    /// Capital tied up in stock: sum of quantity times cost price.
    pub inventory_value: Decimal,
    /// Completed units sold over current units held, one decimal place.
    pub turnover_rate: f64,
}

pub struct StatsReader {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl StatsReader {
    pub fn new(products: Arc<dyn ProductRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { products, orders }
    }

    pub async fn inventory_stats(&self) -> Result<InventoryStats, ApplicationError> {
        let products = self.products.list().await.map_err(persistence_error)?;
        let total_units_sold = self.orders.total_units_sold().await.map_err(persistence_error)?;

        let total_items = products.len() as i64;
        let low_stock_count = products.iter().filter(|product| product.is_low_stock()).count() as i64;
        let inventory_value: Decimal =
            products.iter().map(|product| product.inventory_value()).sum();

        let total_quantity: i64 = products.iter().map(|product| product.quantity).sum();
        let raw_rate = total_units_sold as f64 / total_quantity.max(1) as f64;
        let turnover_rate = ((raw_rate * 10.0).round() / 10.0).max(MIN_TURNOVER_RATE);

        Ok(InventoryStats { total_items, low_stock_count, inventory_value, turnover_rate })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use stockwise_core::domain::order::{Order, OrderId, OrderItem, OrderStatus};
    use stockwise_core::domain::product::{Product, ProductId};
    use stockwise_db::{InMemoryOrderRepository, InMemoryProductRepository};

    use super::StatsReader;

    fn product(id: &str, quantity: i64, reorder_level: i64, cost: i64) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            sku: format!("SKU-{id}"),
            category: "Essentials".to_string(),
            quantity,
            price: Decimal::from(cost * 2),
            cost_price: Decimal::from(cost),
            supplier_id: 1,
            reorder_level,
            expiry_date: None,
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn stats_aggregate_the_catalog() {
        let products = Arc::new(
            InMemoryProductRepository::with_products(vec![
                product("low", 8, 15, 10),
                product("ok", 40, 10, 25),
            ])
            .await,
        );
        let order = Order {
            id: OrderId("o1".to_string()),
            counterparty: "Cafe".to_string(),
            order_date: Utc::now() - Duration::days(4),
            status: OrderStatus::Completed,
            total_amount: Decimal::from(120),
        };
        let item = OrderItem {
            order_id: OrderId("o1".to_string()),
            product_id: ProductId("ok".to_string()),
            quantity: 12,
            unit_price: Decimal::from(10),
        };
        let orders =
            Arc::new(InMemoryOrderRepository::with_orders(vec![(order, vec![item])]).await);

        let stats = StatsReader::new(products, orders).inventory_stats().await.expect("stats");

        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.low_stock_count, 1);
        // 8 * 10 + 40 * 25 = 1080
        assert_eq!(stats.inventory_value, Decimal::from(1080));
        // 12 sold / 48 held = 0.25 -> rounds to 0.3
        assert!((stats.turnover_rate - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn turnover_is_floored_for_an_idle_store() {
        let products =
            Arc::new(InMemoryProductRepository::with_products(vec![product("p", 50, 10, 10)]).await);
        let orders = Arc::new(InMemoryOrderRepository::default());

        let stats = StatsReader::new(products, orders).inventory_stats().await.expect("stats");
        assert!((stats.turnover_rate - 0.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_catalog_produces_zeroed_stats() {
        let products = Arc::new(InMemoryProductRepository::default());
        let orders = Arc::new(InMemoryOrderRepository::default());

        let stats = StatsReader::new(products, orders).inventory_stats().await.expect("stats");
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.inventory_value, Decimal::ZERO);
        assert!((stats.turnover_rate - 0.1).abs() < 1e-9);
    }
}

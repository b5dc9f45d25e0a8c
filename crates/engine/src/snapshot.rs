use std::sync::Arc;

use chrono::{Duration, Utc};

use stockwise_core::domain::snapshot::InventorySnapshot;
use stockwise_core::errors::ApplicationError;
use stockwise_db::{OrderRepository, ProductRepository};

use crate::persistence_error;

/// Read-only loader for the engine's input state. One catalog read plus one
/// grouped sales read per snapshot; the result is a value and never
/// observes later writes.
pub struct SnapshotReader {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl SnapshotReader {
    pub fn new(products: Arc<dyn ProductRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { products, orders }
    }

    pub async fn load(&self, window_days: i64) -> Result<InventorySnapshot, ApplicationError> {
        let taken_at = Utc::now();
        let since = taken_at - Duration::days(window_days.max(1));

        let products = self.products.list().await.map_err(persistence_error)?;
        let units_sold = self.orders.units_sold_since(since).await.map_err(persistence_error)?;

        tracing::debug!(
            products = products.len(),
            window_days,
            "loaded inventory snapshot"
        );

        Ok(InventorySnapshot::new(taken_at, window_days.max(1), products, units_sold))
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

    use super::SnapshotReader;

    fn product(id: &str, quantity: i64) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: id.to_string(),
            sku: format!("SKU-{id}"),
            category: "Essentials".to_string(),
            quantity,
            price: Decimal::from(50),
            cost_price: Decimal::from(30),
            supplier_id: 1,
            reorder_level: 10,
            expiry_date: None,
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn snapshot_carries_catalog_and_window_sales() {
        let products =
            Arc::new(InMemoryProductRepository::with_products(vec![product("p1", 40)]).await);
        let order = Order {
            id: OrderId("o1".to_string()),
            counterparty: "Cafe".to_string(),
            order_date: Utc::now() - Duration::days(3),
            status: OrderStatus::Completed,
            total_amount: Decimal::from(50),
        };
        let item = OrderItem {
            order_id: OrderId("o1".to_string()),
            product_id: ProductId("p1".to_string()),
            quantity: 5,
            unit_price: Decimal::from(10),
        };
        let orders =
            Arc::new(InMemoryOrderRepository::with_orders(vec![(order, vec![item])]).await);

        let reader = SnapshotReader::new(products, orders);
        let snapshot = reader.load(30).await.expect("load");

        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.window_days, 30);
        assert_eq!(snapshot.units_sold_for(&ProductId("p1".to_string())), 5);
    }

    #[tokio::test]
    async fn degenerate_window_is_floored_to_one_day() {
        let products = Arc::new(InMemoryProductRepository::default());
        let orders = Arc::new(InMemoryOrderRepository::default());
        let reader = SnapshotReader::new(products, orders);

        let snapshot = reader.load(0).await.expect("load");
        assert_eq!(snapshot.window_days, 1);
    }
}

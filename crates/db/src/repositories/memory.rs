use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use stockwise_core::domain::order::{Order, OrderItem, OrderStatus, SoldLine};
use stockwise_core::domain::product::{Product, ProductId};

use super::{OrderRepository, ProductRepository, RepositoryError};

/// Catalog held in a `Vec` so listing preserves insertion order, matching
/// the SQL repository's rowid ordering.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub async fn with_products(products: Vec<Product>) -> Self {
        let repo = Self::default();
        for product in products {
            repo.insert(product).await.expect("seed in-memory product");
        }
        repo
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.clone())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.push(product);
        Ok(())
    }

    async fn adjust_quantity(&self, id: &ProductId, delta: i64) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(|| RepositoryError::NotFound { entity: "product", id: id.0.clone() })?;

        if product.quantity + delta < 0 {
            return Err(RepositoryError::InsufficientStock { product_id: id.0.clone(), delta });
        }

        product.quantity += delta;
        product.last_updated = Utc::now();
        Ok(())
    }

    async fn set_price(&self, id: &ProductId, value: Decimal) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(|| RepositoryError::NotFound { entity: "product", id: id.0.clone() })?;

        product.price = value;
        product.last_updated = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<(Order, Vec<OrderItem>)>>,
}

impl InMemoryOrderRepository {
    pub async fn with_orders(orders: Vec<(Order, Vec<OrderItem>)>) -> Self {
        let repo = Self::default();
        for (order, items) in orders {
            repo.record_order(order, items).await.expect("seed in-memory order");
        }
        repo
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn record_order(
        &self,
        order: Order,
        items: Vec<OrderItem>,
    ) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        orders.push((order, items));
        Ok(())
    }

    async fn units_sold_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<ProductId, i64>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut units_sold: HashMap<ProductId, i64> = HashMap::new();
        for (order, items) in orders.iter() {
            if order.status != OrderStatus::Completed || order.order_date < since {
                continue;
            }
            for item in items {
                *units_sold.entry(item.product_id.clone()).or_insert(0) += item.quantity;
            }
        }
        Ok(units_sold)
    }

    async fn sold_lines_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SoldLine>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut lines: Vec<SoldLine> = orders
            .iter()
            .filter(|(order, _)| order.status == OrderStatus::Completed && order.order_date >= since)
            .flat_map(|(order, items)| {
                items.iter().map(|item| SoldLine {
                    product_id: item.product_id.clone(),
                    order_date: order.order_date,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
            })
            .collect();
        lines.sort_by_key(|line| line.order_date);
        Ok(lines)
    }

    async fn total_units_sold(&self) -> Result<i64, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|(order, _)| order.status == OrderStatus::Completed)
            .flat_map(|(_, items)| items.iter().map(|item| item.quantity))
            .sum())
    }
}

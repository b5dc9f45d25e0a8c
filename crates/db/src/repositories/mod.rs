use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use stockwise_core::domain::order::{Order, OrderItem, SoldLine};
use stockwise_core::domain::product::{Product, ProductId};

pub mod memory;
pub mod order;
pub mod product;

pub use memory::{InMemoryOrderRepository, InMemoryProductRepository};
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("insufficient stock for product {product_id}: delta {delta} would go below zero")]
    InsufficientStock { product_id: String, delta: i64 },
}

/// Catalog reads plus the two scoped writes the engine is allowed to make.
/// `adjust_quantity` is a single atomic increment keyed by product id;
/// concurrent adjustments to different products are independent, and
/// concurrent adjustments to the same product serialize without lost
/// updates.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn insert(&self, product: Product) -> Result<(), RepositoryError>;

    /// Atomically applies `delta` to the product's quantity. Rejects
    /// adjustments that would take stock below zero.
    async fn adjust_quantity(&self, id: &ProductId, delta: i64) -> Result<(), RepositoryError>;

    async fn set_price(&self, id: &ProductId, value: Decimal) -> Result<(), RepositoryError>;
}

/// Order history reads used for sales aggregates and reports. Only
/// completed orders count as sales.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn record_order(
        &self,
        order: Order,
        items: Vec<OrderItem>,
    ) -> Result<(), RepositoryError>;

    /// Units sold per product from completed orders on or after `since`.
    async fn units_sold_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<ProductId, i64>, RepositoryError>;

    /// Completed-order line items on or after `since`, oldest first, for
    /// calendar-bucket aggregation.
    async fn sold_lines_since(&self, since: DateTime<Utc>)
        -> Result<Vec<SoldLine>, RepositoryError>;

    /// All-time completed units, for the turnover rate.
    async fn total_units_sold(&self) -> Result<i64, RepositoryError>;
}

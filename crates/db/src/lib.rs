pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_from_config, connect_with_settings, DbPool};
pub use fixtures::{DemoSeedDataset, ProductSeedInfo, SeedResult, VerificationResult};
pub use repositories::{
    InMemoryOrderRepository, InMemoryProductRepository, OrderRepository, ProductRepository,
    RepositoryError, SqlOrderRepository, SqlProductRepository,
};

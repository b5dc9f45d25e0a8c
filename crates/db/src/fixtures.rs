use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

struct SeedProductContract {
    id: &'static str,
    sku: &'static str,
    name: &'static str,
    category: &'static str,
    quantity: i64,
}

/// Canonical demo catalog contract: one entry per seeded product.
const SEED_PRODUCTS: &[SeedProductContract] = &[
    SeedProductContract {
        id: "prod-milk-1l",
        sku: "DRY-MILK-1L",
        name: "Milk 1L",
        category: "Dairy",
        quantity: 40,
    },
    SeedProductContract {
        id: "prod-paneer-200g",
        sku: "DRY-PNR-200",
        name: "Paneer 200g",
        category: "Dairy",
        quantity: 18,
    },
    SeedProductContract {
        id: "prod-toffee-box",
        sku: "CNF-TOF-BOX",
        name: "Toffee Box",
        category: "Confectionery",
        quantity: 55,
    },
    SeedProductContract {
        id: "prod-choc-bar",
        sku: "CNF-CHC-BAR",
        name: "Chocolate Bar",
        category: "Confectionery",
        quantity: 25,
    },
    SeedProductContract {
        id: "prod-rice-5kg",
        sku: "STP-RCE-5KG",
        name: "Rice 5kg",
        category: "Staples",
        quantity: 120,
    },
    SeedProductContract {
        id: "prod-atta-5kg",
        sku: "STP-ATA-5KG",
        name: "Wheat Flour 5kg",
        category: "Staples",
        quantity: 90,
    },
    SeedProductContract {
        id: "prod-soap-bar",
        sku: "ESS-SOP-BAR",
        name: "Soap Bar",
        category: "Essentials",
        quantity: 8,
    },
    SeedProductContract {
        id: "prod-toothpaste",
        sku: "ESS-TPS-100",
        name: "Toothpaste",
        category: "Essentials",
        quantity: 30,
    },
];

const SEED_ORDER_COUNT: i64 = 4;
const SEED_COMPLETED_ORDER_COUNT: i64 = 3;
const SEED_ORDER_ITEM_COUNT: i64 = 8;

#[derive(Clone, Debug)]
pub struct ProductSeedInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
}

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub products_seeded: Vec<ProductSeedInfo>,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Demo dataset: a four-category catalog plus a short completed/pending
/// order history, enough for every scenario and report to produce
/// non-trivial output.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// SQL fixture content for the demo dataset.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_inventory.sql");

    /// Load the demo dataset into the database.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let products_seeded = SEED_PRODUCTS
            .iter()
            .map(|product| ProductSeedInfo {
                id: product.id,
                name: product.name,
                category: product.category,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { products_seeded })
    }

    /// Verify that seed data exists and matches the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for product in SEED_PRODUCTS {
            let present: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM product WHERE id = ?1 AND sku = ?2 AND category = ?3 AND quantity = ?4)",
            )
            .bind(product.id)
            .bind(product.sku)
            .bind(product.category)
            .bind(product.quantity)
            .fetch_one(pool)
            .await?;
            checks.push((product.id, present == 1));
        }

        let order_count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM customer_order")
            .fetch_one(pool)
            .await?;
        checks.push(("order-count", order_count == SEED_ORDER_COUNT));

        let completed_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM customer_order WHERE status = 'Completed'")
                .fetch_one(pool)
                .await?;
        checks.push(("completed-order-count", completed_count == SEED_COMPLETED_ORDER_COUNT));

        let item_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM order_item").fetch_one(pool).await?;
        checks.push(("order-item-count", item_count == SEED_ORDER_ITEM_COUNT));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}

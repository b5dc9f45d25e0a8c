use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use stockwise_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub quantity: i64,
    pub price: String,
    pub cost_price: String,
    pub supplier_id: i64,
    pub reorder_level: i64,
    pub expiry_date: Option<String>,
    pub last_updated: String,
}

impl TryFrom<ProductRecord> for Product {
    type Error = RepositoryError;

    fn try_from(value: ProductRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId(value.id),
            name: value.name,
            sku: value.sku,
            category: value.category,
            quantity: value.quantity,
            price: parse_decimal("product price", &value.price)?,
            cost_price: parse_decimal("product cost_price", &value.cost_price)?,
            supplier_id: value.supplier_id,
            reorder_level: value.reorder_level,
            expiry_date: value
                .expiry_date
                .as_deref()
                .map(|raw| parse_date("product expiry_date", raw))
                .transpose()?,
            last_updated: parse_rfc3339("product last_updated", &value.last_updated)?,
        })
    }
}

impl From<Product> for ProductRecord {
    fn from(value: Product) -> Self {
        Self {
            id: value.id.0,
            name: value.name,
            sku: value.sku,
            category: value.category,
            quantity: value.quantity,
            price: value.price.to_string(),
            cost_price: value.cost_price.to_string(),
            supplier_id: value.supplier_id,
            reorder_level: value.reorder_level,
            expiry_date: value.expiry_date.map(|date| date.format("%Y-%m-%d").to_string()),
            last_updated: value.last_updated.to_rfc3339(),
        }
    }
}

pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw)
        .map_err(|_| RepositoryError::Decode(format!("invalid {field}: {raw}")))
}

pub(crate) fn parse_rfc3339(field: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| RepositoryError::Decode(format!("invalid {field}: {raw}")))
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| RepositoryError::Decode(format!("invalid {field}: {raw}")))
}

fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let record = ProductRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        sku: row.try_get("sku")?,
        category: row.try_get("category")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        cost_price: row.try_get("cost_price")?,
        supplier_id: row.try_get("supplier_id")?,
        reorder_level: row.try_get("reorder_level")?,
        expiry_date: row.try_get("expiry_date")?,
        last_updated: row.try_get("last_updated")?,
    };
    record.try_into()
}

const PRODUCT_COLUMNS: &str = "id, name, sku, category, quantity, price, cost_price, supplier_id, reorder_level, expiry_date, last_updated";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?1"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn insert(&self, product: Product) -> Result<(), RepositoryError> {
        let record = ProductRecord::from(product);
        sqlx::query(
            r#"
            INSERT INTO product (
                id, name, sku, category, quantity, price, cost_price,
                supplier_id, reorder_level, expiry_date, last_updated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.sku)
        .bind(&record.category)
        .bind(record.quantity)
        .bind(&record.price)
        .bind(&record.cost_price)
        .bind(record.supplier_id)
        .bind(record.reorder_level)
        .bind(&record.expiry_date)
        .bind(&record.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn adjust_quantity(&self, id: &ProductId, delta: i64) -> Result<(), RepositoryError> {
        // Single-statement increment with the underflow guard folded into
        // the predicate, so the read and the write cannot interleave with
        // another writer.
        let result = sqlx::query(
            r#"
            UPDATE product
            SET quantity = quantity + ?1, last_updated = ?2
            WHERE id = ?3 AND quantity + ?1 >= 0
            "#,
        )
        .bind(delta)
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => {
                    Err(RepositoryError::InsufficientStock { product_id: id.0.clone(), delta })
                }
                None => Err(RepositoryError::NotFound { entity: "product", id: id.0.clone() }),
            };
        }

        Ok(())
    }

    async fn set_price(&self, id: &ProductId, value: Decimal) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE product SET price = ?1, last_updated = ?2 WHERE id = ?3",
        )
        .bind(value.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "product", id: id.0.clone() });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use stockwise_core::domain::product::{Product, ProductId};

    use super::SqlProductRepository;
    use crate::repositories::{ProductRepository, RepositoryError};
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlProductRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        SqlProductRepository::new(pool)
    }

    fn product(id: &str, quantity: i64) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: format!("Product {id}"),
            sku: format!("SKU-{id}"),
            category: "Essentials".to_string(),
            quantity,
            price: Decimal::new(9950, 2),
            cost_price: Decimal::new(6000, 2),
            supplier_id: 4,
            reorder_level: 15,
            expiry_date: NaiveDate::from_ymd_opt(2026, 12, 31),
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_read_back_preserves_decimal_fields() {
        let repo = repo().await;
        let original = product("p1", 8);
        repo.insert(original.clone()).await.expect("insert");

        let found = repo.find_by_id(&original.id).await.expect("find").expect("present");
        assert_eq!(found.price, Decimal::new(9950, 2));
        assert_eq!(found.cost_price, Decimal::new(6000, 2));
        assert_eq!(found.expiry_date, NaiveDate::from_ymd_opt(2026, 12, 31));
        assert_eq!(found.quantity, 8);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let repo = repo().await;
        for id in ["b", "a", "c"] {
            repo.insert(product(id, 10)).await.expect("insert");
        }

        let listed = repo.list().await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|p| p.id.0.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn concurrent_adjustments_converge_without_lost_updates() {
        let repo = std::sync::Arc::new(repo().await);
        let target = product("p1", 10);
        repo.insert(target.clone()).await.expect("insert");

        let up = {
            let repo = repo.clone();
            let id = target.id.clone();
            tokio::spawn(async move { repo.adjust_quantity(&id, 5).await })
        };
        let down = {
            let repo = repo.clone();
            let id = target.id.clone();
            tokio::spawn(async move { repo.adjust_quantity(&id, -3).await })
        };
        up.await.expect("join").expect("adjust up");
        down.await.expect("join").expect("adjust down");

        let found = repo.find_by_id(&target.id).await.expect("find").expect("present");
        assert_eq!(found.quantity, 12);
    }

    #[tokio::test]
    async fn adjustment_below_zero_is_rejected() {
        let repo = repo().await;
        let target = product("p1", 4);
        repo.insert(target.clone()).await.expect("insert");

        let error = repo.adjust_quantity(&target.id, -5).await.expect_err("must reject");
        assert!(matches!(error, RepositoryError::InsufficientStock { delta: -5, .. }));

        let found = repo.find_by_id(&target.id).await.expect("find").expect("present");
        assert_eq!(found.quantity, 4);
    }

    #[tokio::test]
    async fn adjusting_a_missing_product_reports_not_found() {
        let repo = repo().await;
        let error = repo
            .adjust_quantity(&ProductId("ghost".to_string()), 1)
            .await
            .expect_err("must reject");
        assert!(matches!(error, RepositoryError::NotFound { entity: "product", .. }));
    }

    #[tokio::test]
    async fn set_price_overwrites_only_the_price() {
        let repo = repo().await;
        let target = product("p1", 4);
        repo.insert(target.clone()).await.expect("insert");

        repo.set_price(&target.id, Decimal::new(12000, 2)).await.expect("set price");

        let found = repo.find_by_id(&target.id).await.expect("find").expect("present");
        assert_eq!(found.price, Decimal::new(12000, 2));
        assert_eq!(found.cost_price, target.cost_price);
        assert_eq!(found.quantity, 4);
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use stockwise_core::domain::order::{Order, OrderItem, OrderStatus, SoldLine};
use stockwise_core::domain::product::ProductId;

use super::product::{parse_decimal, parse_rfc3339};
use super::{OrderRepository, RepositoryError};
use crate::DbPool;

fn sold_line_from_row(row: &SqliteRow) -> Result<SoldLine, RepositoryError> {
    let unit_price: String = row.try_get("unit_price")?;
    let order_date: String = row.try_get("order_date")?;
    Ok(SoldLine {
        product_id: ProductId(row.try_get("product_id")?),
        order_date: parse_rfc3339("order_item order_date", &order_date)?,
        quantity: row.try_get("quantity")?,
        unit_price: parse_decimal("order_item unit_price", &unit_price)?,
    })
}

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn record_order(
        &self,
        order: Order,
        items: Vec<OrderItem>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO customer_order (id, counterparty, order_date, status, total_amount)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id.0)
        .bind(&order.counterparty)
        .bind(order.order_date.to_rfc3339())
        .bind(order.status.as_str())
        .bind(order.total_amount.to_string())
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_item (id, order_id, product_id, quantity, unit_price)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(format!("item-{}", uuid::Uuid::new_v4()))
            .bind(&item.order_id.0)
            .bind(&item.product_id.0)
            .bind(item.quantity)
            .bind(item.unit_price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn units_sold_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<ProductId, i64>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT oi.product_id AS product_id, SUM(oi.quantity) AS units
            FROM order_item oi
            JOIN customer_order o ON o.id = oi.order_id
            WHERE o.status = ?1 AND o.order_date >= ?2
            GROUP BY oi.product_id
            "#,
        )
        .bind(OrderStatus::Completed.as_str())
        .bind(since.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        let mut units_sold = HashMap::with_capacity(rows.len());
        for row in &rows {
            let product_id: String = row.try_get("product_id")?;
            let units: i64 = row.try_get("units")?;
            units_sold.insert(ProductId(product_id), units);
        }
        Ok(units_sold)
    }

    async fn sold_lines_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SoldLine>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT oi.product_id AS product_id, o.order_date AS order_date,
                   oi.quantity AS quantity, oi.unit_price AS unit_price
            FROM order_item oi
            JOIN customer_order o ON o.id = oi.order_id
            WHERE o.status = ?1 AND o.order_date >= ?2
            ORDER BY o.order_date
            "#,
        )
        .bind(OrderStatus::Completed.as_str())
        .bind(since.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(sold_line_from_row).collect()
    }

    async fn total_units_sold(&self) -> Result<i64, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(oi.quantity), 0)
            FROM order_item oi
            JOIN customer_order o ON o.id = oi.order_id
            WHERE o.status = ?1
            "#,
        )
        .bind(OrderStatus::Completed.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use stockwise_core::domain::order::{Order, OrderId, OrderItem, OrderStatus};
    use stockwise_core::domain::product::ProductId;

    use super::SqlOrderRepository;
    use crate::repositories::OrderRepository;
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlOrderRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        // Product rows are needed for the order_item foreign key.
        for id in ["p1", "p2"] {
            sqlx::query(
                "INSERT INTO product (id, name, sku, category, quantity, price, cost_price, supplier_id, reorder_level, last_updated) VALUES (?1, ?1, ?1, 'Essentials', 10, '10', '5', 1, 5, ?2)",
            )
            .bind(id)
            .bind(Utc::now().to_rfc3339())
            .execute(&pool)
            .await
            .expect("seed product");
        }
        SqlOrderRepository::new(pool)
    }

    fn order(id: &str, status: OrderStatus, days_ago: i64) -> Order {
        Order {
            id: OrderId(id.to_string()),
            counterparty: "Corner Cafe".to_string(),
            order_date: Utc::now() - Duration::days(days_ago),
            status,
            total_amount: Decimal::from(100),
        }
    }

    fn item(order_id: &str, product_id: &str, quantity: i64) -> OrderItem {
        OrderItem {
            order_id: OrderId(order_id.to_string()),
            product_id: ProductId(product_id.to_string()),
            quantity,
            unit_price: Decimal::from(10),
        }
    }

    #[tokio::test]
    async fn only_completed_orders_count_as_sales() {
        let repo = repo().await;
        repo.record_order(order("o1", OrderStatus::Completed, 2), vec![item("o1", "p1", 6)])
            .await
            .expect("record completed");
        repo.record_order(order("o2", OrderStatus::Pending, 1), vec![item("o2", "p1", 4)])
            .await
            .expect("record pending");

        let since = Utc::now() - chrono::Duration::days(30);
        let units = repo.units_sold_since(since).await.expect("aggregate");
        assert_eq!(units.get(&ProductId("p1".to_string())), Some(&6));
        assert_eq!(repo.total_units_sold().await.expect("total"), 6);
    }

    #[tokio::test]
    async fn window_excludes_older_orders() {
        let repo = repo().await;
        repo.record_order(order("o1", OrderStatus::Completed, 40), vec![item("o1", "p1", 9)])
            .await
            .expect("record old");
        repo.record_order(order("o2", OrderStatus::Completed, 3), vec![item("o2", "p2", 2)])
            .await
            .expect("record recent");

        let since = Utc::now() - chrono::Duration::days(30);
        let units = repo.units_sold_since(since).await.expect("aggregate");
        assert!(!units.contains_key(&ProductId("p1".to_string())));
        assert_eq!(units.get(&ProductId("p2".to_string())), Some(&2));

        // All-time total still sees both.
        assert_eq!(repo.total_units_sold().await.expect("total"), 11);
    }

    #[tokio::test]
    async fn sold_lines_come_back_oldest_first() {
        let repo = repo().await;
        repo.record_order(order("o1", OrderStatus::Completed, 1), vec![item("o1", "p1", 2)])
            .await
            .expect("record newer");
        repo.record_order(order("o2", OrderStatus::Completed, 5), vec![item("o2", "p2", 3)])
            .await
            .expect("record older");

        let since = Utc::now() - chrono::Duration::days(30);
        let lines = repo.sold_lines_since(since).await.expect("lines");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id.0, "p2");
        assert_eq!(lines[1].product_id.0, "p1");
        assert_eq!(lines[0].revenue(), Decimal::from(30));
    }
}

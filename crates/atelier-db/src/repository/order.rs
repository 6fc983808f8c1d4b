//! # Order Repository
//!
//! Order persistence and the one aggregate the offer engine needs: how
//! many non-cancelled orders a user has placed. A user with zero such
//! orders still counts as "new" for segment-restricted offers, so
//! cancelled orders are excluded from the count.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use atelier_core::{Money, Order, OrderStatus};

/// Database row shape for an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    status: OrderStatus,
    total_pence: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            total: Money::from_pence(row.total_pence),
            created_at: row.created_at,
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a new order.
    pub async fn create(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, user = %order.user_id, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, total_pence, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.total.pence())
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an order's status.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Counts a user's orders excluding cancelled ones.
    ///
    /// Zero means the user qualifies as new for segment-restricted offers.
    pub async fn count_non_cancelled_for_user(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM orders
            WHERE user_id = ?1
              AND status != 'cancelled'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, total_pence, created_at FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn order(id: &str, user: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            user_id: user.to_string(),
            status,
            total: Money::from_pence(15000),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cancelled_orders_excluded_from_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        repo.create(&order("ord-1", "user-1", OrderStatus::Completed))
            .await
            .unwrap();
        repo.create(&order("ord-2", "user-1", OrderStatus::Pending))
            .await
            .unwrap();
        repo.create(&order("ord-3", "user-1", OrderStatus::Cancelled))
            .await
            .unwrap();

        let count = repo.count_non_cancelled_for_user("user-1").await.unwrap();
        assert_eq!(count, 2);

        // A user whose only order was cancelled is still new
        repo.create(&order("ord-4", "user-2", OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(repo.count_non_cancelled_for_user("user-2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_status_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        repo.create(&order("ord-1", "user-1", OrderStatus::Pending))
            .await
            .unwrap();
        repo.set_status("ord-1", OrderStatus::Cancelled).await.unwrap();

        let fetched = repo.get_by_id("ord-1").await.unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Cancelled);
        assert_eq!(repo.count_non_cancelled_for_user("user-1").await.unwrap(), 0);
    }
}

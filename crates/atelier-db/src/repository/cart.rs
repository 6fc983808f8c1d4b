//! # Cart Repository
//!
//! Persistence for cart documents.
//!
//! Carts are written whole: the offer engine computes the next cart state
//! in memory (items, subtotal, discount fields, hint cache) and `save`
//! upserts the full row. Items and the eligible-offer hint cache are JSON
//! columns, matching the document shape the storefront already persists.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use atelier_core::{Cart, CartItem, DiscountMethod, EligibleOfferHint, Money};

/// Database row shape for a cart.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    user_id: Option<String>,
    items: String,
    subtotal_pence: i64,
    discount_code: Option<String>,
    discount_amount_pence: i64,
    offer_id: Option<String>,
    is_auto_applied: bool,
    discount_method: DiscountMethod,
    manual_code_locked: bool,
    eligible_auto_offers: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartRow {
    fn into_cart(self) -> DbResult<Cart> {
        let items: Vec<CartItem> = serde_json::from_str(&self.items)?;
        let eligible_auto_offers: Vec<EligibleOfferHint> =
            serde_json::from_str(&self.eligible_auto_offers)?;

        Ok(Cart {
            id: self.id,
            user_id: self.user_id,
            items,
            subtotal: Money::from_pence(self.subtotal_pence),
            discount_code: self.discount_code,
            discount_amount: Money::from_pence(self.discount_amount_pence),
            offer_id: self.offer_id,
            is_auto_applied: self.is_auto_applied,
            discount_method: self.discount_method,
            manual_code_locked: self.manual_code_locked,
            eligible_auto_offers,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Creates and persists an empty cart with a fresh UUID.
    pub async fn create(&self, user_id: Option<String>) -> DbResult<Cart> {
        let cart = Cart::new(Uuid::new_v4().to_string(), user_id);
        self.save(&cart).await?;
        Ok(cart)
    }

    /// Gets a cart by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT
                id, user_id, items, subtotal_pence,
                discount_code, discount_amount_pence, offer_id,
                is_auto_applied, discount_method, manual_code_locked,
                eligible_auto_offers, created_at, updated_at
            FROM carts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartRow::into_cart).transpose()
    }

    /// Upserts the full cart row.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        debug!(id = %cart.id, subtotal = %cart.subtotal, "Saving cart");

        let items = serde_json::to_string(&cart.items)?;
        let hints = serde_json::to_string(&cart.eligible_auto_offers)?;

        sqlx::query(
            r#"
            INSERT INTO carts (
                id, user_id, items, subtotal_pence,
                discount_code, discount_amount_pence, offer_id,
                is_auto_applied, discount_method, manual_code_locked,
                eligible_auto_offers, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                items = excluded.items,
                subtotal_pence = excluded.subtotal_pence,
                discount_code = excluded.discount_code,
                discount_amount_pence = excluded.discount_amount_pence,
                offer_id = excluded.offer_id,
                is_auto_applied = excluded.is_auto_applied,
                discount_method = excluded.discount_method,
                manual_code_locked = excluded.manual_code_locked,
                eligible_auto_offers = excluded.eligible_auto_offers,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&cart.id)
        .bind(&cart.user_id)
        .bind(items)
        .bind(cart.subtotal.pence())
        .bind(&cart.discount_code)
        .bind(cart.discount_amount.pence())
        .bind(&cart.offer_id)
        .bind(cart.is_auto_applied)
        .bind(cart.discount_method)
        .bind(cart.manual_code_locked)
        .bind(hints)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atelier_core::PriceBreakdown;

    fn cart_with_item() -> Cart {
        let mut cart = Cart::new("cart-1", Some("user-1".to_string()));
        cart.items.push(CartItem {
            product_id: "p1".to_string(),
            product_name: "Bar Pull".to_string(),
            material_name: "Brass".to_string(),
            size_mm: Some(160),
            finish_ids: vec!["fin-satin".to_string()],
            breakdown: PriceBreakdown {
                material: Money::from_pence(7500),
                size: Money::from_pence(500),
                finishes: Money::from_pence(600),
                packaging: Money::zero(),
            },
            unit_price: Money::from_pence(8600),
            quantity: 2,
            include_packaging: false,
            added_at: Utc::now(),
        });
        cart.recompute_subtotal();
        cart
    }

    #[tokio::test]
    async fn test_save_and_get_roundtrips_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.carts();

        repo.save(&cart_with_item()).await.unwrap();

        let fetched = repo.get_by_id("cart-1").await.unwrap().unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].unit_price.pence(), 8600);
        assert_eq!(fetched.subtotal.pence(), 17200);
        assert_eq!(fetched.discount_method, DiscountMethod::None);
    }

    #[tokio::test]
    async fn test_save_upserts_discount_state() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.carts();

        let mut cart = cart_with_item();
        repo.save(&cart).await.unwrap();

        cart.discount_code = Some("AUTUMN10".to_string());
        cart.discount_amount = Money::from_pence(1720);
        cart.offer_id = Some("o1".to_string());
        cart.is_auto_applied = true;
        cart.discount_method = DiscountMethod::Auto;
        repo.save(&cart).await.unwrap();

        let fetched = repo.get_by_id("cart-1").await.unwrap().unwrap();
        assert_eq!(fetched.discount_code.as_deref(), Some("AUTUMN10"));
        assert_eq!(fetched.discount_amount.pence(), 1720);
        assert_eq!(fetched.discount_method, DiscountMethod::Auto);
        assert!(fetched.is_auto_applied);
    }

    #[tokio::test]
    async fn test_create_persists_empty_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.carts();

        let cart = repo.create(Some("user-1".to_string())).await.unwrap();

        let fetched = repo.get_by_id(&cart.id).await.unwrap().unwrap();
        assert!(fetched.items.is_empty());
        assert_eq!(fetched.user_id.as_deref(), Some("user-1"));
        assert_eq!(fetched.subtotal, Money::zero());
    }

    #[tokio::test]
    async fn test_missing_cart_returns_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.carts().get_by_id("nope").await.unwrap().is_none());
    }
}

//! # Offer Repository
//!
//! Database operations for promotional offers.
//!
//! ## Query Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   The Two Hot Offer Queries                              │
//! │                                                                         │
//! │  Auto-apply candidate scan (every cart change):                        │
//! │     WHERE auto_apply = 1                                                │
//! │       AND is_active  = 1                                                │
//! │       AND min_order_pence <= :subtotal                                  │
//! │     ORDER BY priority DESC, discount_value DESC                         │
//! │                                                                         │
//! │     The ORDER BY is advisory prefiltering only. The binding ranking     │
//! │     happens in memory on the *computed* discount, because a fixed       │
//! │     £15 can beat 10% on a £120 cart but lose on a £200 cart.           │
//! │                                                                         │
//! │  Near-miss window scan (cart screen):                                   │
//! │     WHERE is_active = 1 AND show_in_cart = 1                            │
//! │       AND min_order_pence >  :subtotal                                  │
//! │       AND min_order_pence <= :subtotal + :gap                           │
//! │     ORDER BY min_order_pence ASC                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Counters
//! `used_count` and `auto_apply_count` are only ever changed with atomic
//! `SET n = n + 1` updates. Read-modify-write from Rust would lose
//! increments under concurrent cart activity.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use atelier_core::{ApplicableTo, DiscountType, Money, Offer};

/// Database row shape for an offer.
#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    id: String,
    code: String,
    description: Option<String>,
    discount_type: DiscountType,
    discount_value: i64,
    min_order_pence: i64,
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
    max_uses: Option<i64>,
    used_count: i64,
    auto_apply: bool,
    is_active: bool,
    priority: i64,
    applicable_to: ApplicableTo,
    show_in_cart: bool,
    auto_apply_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OfferRow> for Offer {
    fn from(row: OfferRow) -> Self {
        Offer {
            id: row.id,
            code: row.code,
            description: row.description,
            discount_type: row.discount_type,
            discount_value: row.discount_value,
            min_order_amount: Money::from_pence(row.min_order_pence),
            valid_from: row.valid_from,
            valid_to: row.valid_to,
            max_uses: row.max_uses,
            used_count: row.used_count,
            auto_apply: row.auto_apply,
            is_active: row.is_active,
            priority: row.priority,
            applicable_to: row.applicable_to,
            show_in_cart: row.show_in_cart,
            auto_apply_count: row.auto_apply_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const OFFER_COLUMNS: &str = r#"
    id, code, description, discount_type, discount_value,
    min_order_pence, valid_from, valid_to, max_uses, used_count,
    auto_apply, is_active, priority, applicable_to, show_in_cart,
    auto_apply_count, created_at, updated_at
"#;

/// Repository for offer database operations.
#[derive(Debug, Clone)]
pub struct OfferRepository {
    pool: SqlitePool,
}

impl OfferRepository {
    /// Creates a new OfferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OfferRepository { pool }
    }

    /// Gets an offer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Offer::from))
    }

    /// Gets an offer by its display code, case-insensitively.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE code = ?1 COLLATE NOCASE"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Offer::from))
    }

    /// Finds active auto-apply offers whose minimum the subtotal already
    /// meets. Time-window, usage-cap, and segment checks happen in memory
    /// on the returned rows.
    ///
    /// The sort is an advisory prefilter; final ranking is by computed
    /// discount, which depends on the subtotal.
    pub async fn find_auto_apply_candidates(&self, subtotal: Money) -> DbResult<Vec<Offer>> {
        debug!(subtotal = %subtotal, "Scanning auto-apply candidates");

        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            r#"
            SELECT {OFFER_COLUMNS}
            FROM offers
            WHERE auto_apply = 1
              AND is_active = 1
              AND min_order_pence <= ?1
            ORDER BY priority DESC, discount_value DESC
            "#
        ))
        .bind(subtotal.pence())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Offer::from).collect())
    }

    /// Finds cart-visible auto-apply offers whose minimum sits just above
    /// the subtotal, within `gap`. Closest minimum first.
    ///
    /// Only auto-apply offers qualify: a nudge for a manual-code-only
    /// offer would promise a discount the engine never applies.
    pub async fn find_near_miss_window(&self, subtotal: Money, gap: Money) -> DbResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            r#"
            SELECT {OFFER_COLUMNS}
            FROM offers
            WHERE auto_apply = 1
              AND is_active = 1
              AND show_in_cart = 1
              AND min_order_pence > ?1
              AND min_order_pence <= ?2
            ORDER BY min_order_pence ASC
            "#
        ))
        .bind(subtotal.pence())
        .bind((subtotal + gap).pence())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Offer::from).collect())
    }

    /// Inserts a new offer.
    pub async fn create(&self, offer: &Offer) -> DbResult<()> {
        debug!(id = %offer.id, code = %offer.code, "Inserting offer");

        sqlx::query(
            r#"
            INSERT INTO offers (
                id, code, description, discount_type, discount_value,
                min_order_pence, valid_from, valid_to, max_uses, used_count,
                auto_apply, is_active, priority, applicable_to, show_in_cart,
                auto_apply_count, created_at, updated_at
            )
            VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18
            )
            "#,
        )
        .bind(&offer.id)
        .bind(&offer.code)
        .bind(&offer.description)
        .bind(offer.discount_type)
        .bind(offer.discount_value)
        .bind(offer.min_order_amount.pence())
        .bind(offer.valid_from)
        .bind(offer.valid_to)
        .bind(offer.max_uses)
        .bind(offer.used_count)
        .bind(offer.auto_apply)
        .bind(offer.is_active)
        .bind(offer.priority)
        .bind(offer.applicable_to)
        .bind(offer.show_in_cart)
        .bind(offer.auto_apply_count)
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically bumps the auto-apply counter for an offer.
    pub async fn increment_auto_apply_count(&self, id: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE offers
            SET auto_apply_count = auto_apply_count + 1,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-deletes an offer. Carts holding its discount keep it; the
    /// offer just stops surfacing in candidate and near-miss scans.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting offer");

        sqlx::query("UPDATE offers SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Atomically bumps the redemption counter for an offer.
    pub async fn increment_used_count(&self, id: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE offers
            SET used_count = used_count + 1,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

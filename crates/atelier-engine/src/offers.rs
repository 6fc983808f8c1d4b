//! # Offer Engine Operations
//!
//! The I/O side of auto-apply: candidate queries, eligibility
//! post-filtering, the persisted cart patch, and near-miss nudges.
//! All decisions are delegated to the pure functions in atelier-core.
//!
//! ## Auto-Apply Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_best_auto_offer(db, cart_id)                                     │
//! │                                                                         │
//! │  1. Load cart                                                           │
//! │  2. ManualLocked? ──► return unchanged (no hint refresh, no writes)     │
//! │  3. Query candidates, post-filter, compute discounts                    │
//! │  4. Refresh the cart's eligible_auto_offers hint cache                  │
//! │  5. decide_auto_offer (pure) ──► Apply / Clear / Keep                   │
//! │       Apply: set discount fields + bump auto_apply_count atomically     │
//! │       Clear: wipe discount fields (auto discounts are not sticky)       │
//! │       Keep:  leave discount fields alone                                │
//! │  6. Save cart, return the new value                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use atelier_core::offers::{
    calculate_offer_discount, decide_auto_offer, potential_discount, rank_offers,
    select_best_offer,
};
use atelier_core::{
    ApplicableTo, AutoOfferVerdict, Cart, DiscountProvenance, EligibleOffer, EligibleOfferHint,
    Money, NearMissOffer, Offer, MAX_NEAR_MISS_OFFERS, NEAR_MISS_GAP,
};
use atelier_db::Database;

use crate::error::EngineResult;
use crate::EngineError;

/// Whether the cart's owner falls in the offer's customer segment.
///
/// `NewUsers` admits guests unconditionally: a guest cannot be proven to
/// have ordered before, and punishing anonymity loses the sale.
async fn segment_eligible(
    db: &Database,
    offer: &Offer,
    user_id: Option<&str>,
) -> EngineResult<bool> {
    match offer.applicable_to {
        ApplicableTo::All => Ok(true),
        ApplicableTo::NewUsers => match user_id {
            None => Ok(true),
            Some(uid) => {
                let orders = db.orders().count_non_cancelled_for_user(uid).await?;
                Ok(orders == 0)
            }
        },
    }
}

/// Finds the offers a cart currently qualifies for, best first.
///
/// The SQL scan handles the cheap filters (flags, minimum spend); the
/// validity window, usage cap, and segment checks run here so they see a
/// single consistent `now` and can hit the orders table.
pub async fn find_eligible_auto_offers(
    db: &Database,
    subtotal: Money,
    user_id: Option<&str>,
    now: DateTime<Utc>,
) -> EngineResult<Vec<EligibleOffer>> {
    if !subtotal.is_positive() {
        return Ok(Vec::new());
    }

    let candidates = db.offers().find_auto_apply_candidates(subtotal).await?;
    debug!(count = candidates.len(), "Auto-apply candidates fetched");

    let mut eligible = Vec::with_capacity(candidates.len());
    for offer in candidates {
        if !offer.is_within_window(now) {
            continue;
        }
        if offer.usage_cap_reached() {
            continue;
        }
        if !segment_eligible(db, &offer, user_id).await? {
            continue;
        }

        let calculated_discount = calculate_offer_discount(&offer, subtotal);
        let priority = offer.priority;
        eligible.push(EligibleOffer {
            offer,
            calculated_discount,
            priority,
        });
    }

    // Authoritative ranking on computed discount; the query sort was
    // advisory prefiltering only
    rank_offers(&mut eligible);

    Ok(eligible)
}

/// Runs one auto-apply pass over a cart and persists the outcome.
///
/// Returns the cart's new value. Locked manual codes short-circuit before
/// any query runs; everything else refreshes the hint cache even when the
/// discount itself is kept.
pub async fn apply_best_auto_offer(db: &Database, cart_id: &str) -> EngineResult<Cart> {
    let mut cart = db
        .carts()
        .get_by_id(cart_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Cart", cart_id))?;

    // A pinned manual code is a customer decision; don't even recompute
    // hints against it
    if cart.provenance() == DiscountProvenance::ManualLocked {
        debug!(cart_id = %cart.id, "Manual code locked, skipping auto-apply");
        return Ok(cart);
    }

    let eligible =
        find_eligible_auto_offers(db, cart.subtotal, cart.user_id.as_deref(), Utc::now()).await?;

    cart.eligible_auto_offers = eligible.iter().map(EligibleOfferHint::from).collect();

    let verdict = decide_auto_offer(
        cart.provenance(),
        cart.discount_amount,
        select_best_offer(&eligible),
    );

    match verdict {
        AutoOfferVerdict::Apply(entry) => {
            info!(
                cart_id = %cart.id,
                offer = %entry.offer.code,
                discount = %entry.calculated_discount,
                "Auto-applying offer"
            );
            cart.apply_auto_offer(&entry.offer, entry.calculated_discount);
            db.offers()
                .increment_auto_apply_count(&entry.offer.id)
                .await?;
        }
        AutoOfferVerdict::Clear => {
            info!(cart_id = %cart.id, "Clearing stale auto-applied discount");
            cart.clear_discount();
        }
        AutoOfferVerdict::Keep => {
            debug!(cart_id = %cart.id, "Keeping current discount");
            cart.updated_at = Utc::now();
        }
    }

    db.carts().save(&cart).await?;
    Ok(cart)
}

/// Offers the customer almost qualifies for, closest minimum first.
///
/// At most [`MAX_NEAR_MISS_OFFERS`] offers whose minimum sits within
/// [`NEAR_MISS_GAP`] above the subtotal, each with the gap to qualify and
/// the discount qualifying would earn.
pub async fn get_near_miss_offers(
    db: &Database,
    subtotal: Money,
    user_id: Option<&str>,
) -> EngineResult<Vec<NearMissOffer>> {
    let window = db
        .offers()
        .find_near_miss_window(subtotal, NEAR_MISS_GAP)
        .await?;

    let now = Utc::now();
    let mut nudges = Vec::new();
    for offer in window {
        if !offer.is_within_window(now) || offer.usage_cap_reached() {
            continue;
        }
        if !segment_eligible(db, &offer, user_id).await? {
            continue;
        }

        nudges.push(NearMissOffer {
            gap_amount: offer.min_order_amount - subtotal,
            potential_discount: potential_discount(&offer),
            offer,
        });

        if nudges.len() == MAX_NEAR_MISS_OFFERS {
            break;
        }
    }

    Ok(nudges)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{DiscountType, Order, OrderStatus};
    use atelier_db::DbConfig;
    use chrono::Duration;

    fn offer(id: &str, code: &str, discount_type: DiscountType, value: i64) -> Offer {
        let now = Utc::now();
        Offer {
            id: id.to_string(),
            code: code.to_string(),
            description: None,
            discount_type,
            discount_value: value,
            min_order_amount: Money::from_pence(5000),
            valid_from: None,
            valid_to: None,
            max_uses: None,
            used_count: 0,
            auto_apply: true,
            is_active: true,
            priority: 0,
            applicable_to: ApplicableTo::All,
            show_in_cart: true,
            auto_apply_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    async fn fresh_db() -> Database {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn save_cart(db: &Database, subtotal_pence: i64, user: Option<&str>) -> Cart {
        let mut cart = Cart::new("cart-1", user.map(String::from));
        cart.subtotal = Money::from_pence(subtotal_pence);
        db.carts().save(&cart).await.unwrap();
        cart
    }

    #[tokio::test]
    async fn test_best_offer_applied_by_computed_discount() {
        let db = fresh_db().await;
        // On a £200 cart, 10% (£20) beats fixed £15 despite lower priority
        let mut fixed = offer("o-fixed", "FIFTEEN", DiscountType::Fixed, 1500);
        fixed.priority = 9;
        db.offers().create(&fixed).await.unwrap();
        db.offers()
            .create(&offer("o-pct", "TEN", DiscountType::Percentage, 1000))
            .await
            .unwrap();

        save_cart(&db, 20000, None).await;

        let cart = apply_best_auto_offer(&db, "cart-1").await.unwrap();
        assert_eq!(cart.discount_code.as_deref(), Some("TEN"));
        assert_eq!(cart.discount_amount.pence(), 2000);
        assert!(cart.is_auto_applied);
        assert_eq!(cart.eligible_auto_offers.len(), 2);

        // Counter bumped on the applied offer only
        let applied = db.offers().get_by_id("o-pct").await.unwrap().unwrap();
        assert_eq!(applied.auto_apply_count, 1);
        let passed_over = db.offers().get_by_id("o-fixed").await.unwrap().unwrap();
        assert_eq!(passed_over.auto_apply_count, 0);
    }

    #[tokio::test]
    async fn test_stale_auto_discount_cleared_when_cart_shrinks() {
        let db = fresh_db().await;
        let o = offer("o1", "TEN", DiscountType::Percentage, 1000);
        db.offers().create(&o).await.unwrap();

        save_cart(&db, 20000, None).await;
        apply_best_auto_offer(&db, "cart-1").await.unwrap();

        // Cart drops below the £50 minimum
        let mut cart = db.carts().get_by_id("cart-1").await.unwrap().unwrap();
        cart.subtotal = Money::from_pence(3000);
        db.carts().save(&cart).await.unwrap();

        let cart = apply_best_auto_offer(&db, "cart-1").await.unwrap();
        assert!(cart.offer_id.is_none());
        assert_eq!(cart.discount_amount, Money::zero());
        assert!(cart.eligible_auto_offers.is_empty());
    }

    #[tokio::test]
    async fn test_locked_manual_code_short_circuits() {
        let db = fresh_db().await;
        db.offers()
            .create(&offer("o1", "HUGE", DiscountType::Percentage, 5000))
            .await
            .unwrap();

        let manual = offer("o-manual", "WELCOME5", DiscountType::Fixed, 500);
        let mut cart = save_cart(&db, 20000, None).await;
        cart.apply_manual_code(&manual, Money::from_pence(500), true);
        db.carts().save(&cart).await.unwrap();

        let cart = apply_best_auto_offer(&db, "cart-1").await.unwrap();
        // 50% off would be far better, but the customer pinned their code
        assert_eq!(cart.discount_code.as_deref(), Some("WELCOME5"));
        assert_eq!(cart.discount_amount.pence(), 500);
        // Short-circuit means the hint cache wasn't refreshed either
        assert!(cart.eligible_auto_offers.is_empty());
    }

    #[tokio::test]
    async fn test_unlocked_manual_code_displaced_only_past_the_bar() {
        let db = fresh_db().await;

        let manual = offer("o-manual", "TENNER", DiscountType::Fixed, 1000);
        let mut cart = save_cart(&db, 20000, None).await;
        cart.apply_manual_code(&manual, Money::from_pence(1000), false);
        db.carts().save(&cart).await.unwrap();

        // £10.50 is only 5% better than the £10.00 manual code
        db.offers()
            .create(&offer("o-small", "SMALL", DiscountType::Fixed, 1050))
            .await
            .unwrap();
        let cart = apply_best_auto_offer(&db, "cart-1").await.unwrap();
        assert_eq!(cart.discount_code.as_deref(), Some("TENNER"));

        // £11.50 clears the 10% bar
        db.offers()
            .create(&offer("o-big", "BIG", DiscountType::Fixed, 1150))
            .await
            .unwrap();
        let cart = apply_best_auto_offer(&db, "cart-1").await.unwrap();
        assert_eq!(cart.discount_code.as_deref(), Some("BIG"));
        assert_eq!(cart.discount_amount.pence(), 1150);
    }

    #[tokio::test]
    async fn test_window_cap_and_segment_post_filters() {
        let db = fresh_db().await;
        let now = Utc::now();

        let mut not_started = offer("o1", "SOON", DiscountType::Fixed, 9000);
        not_started.valid_from = Some(now + Duration::hours(1));
        db.offers().create(&not_started).await.unwrap();

        let mut expired = offer("o2", "GONE", DiscountType::Fixed, 9000);
        expired.valid_to = Some(now - Duration::hours(1));
        db.offers().create(&expired).await.unwrap();

        let mut capped = offer("o3", "CAPPED", DiscountType::Fixed, 9000);
        capped.max_uses = Some(10);
        capped.used_count = 10;
        db.offers().create(&capped).await.unwrap();

        let mut new_users = offer("o4", "FIRSTBUY", DiscountType::Fixed, 9000);
        new_users.applicable_to = ApplicableTo::NewUsers;
        db.offers().create(&new_users).await.unwrap();

        db.offers()
            .create(&offer("o5", "OPEN", DiscountType::Fixed, 100))
            .await
            .unwrap();

        // Returning customer: only the unrestricted offer survives
        db.orders()
            .create(&Order {
                id: "ord-1".to_string(),
                user_id: "user-1".to_string(),
                status: OrderStatus::Completed,
                total: Money::from_pence(15000),
                created_at: now,
            })
            .await
            .unwrap();

        let eligible = find_eligible_auto_offers(&db, Money::from_pence(20000), Some("user-1"), now)
            .await
            .unwrap();
        let ids: Vec<&str> = eligible.iter().map(|e| e.offer.id.as_str()).collect();
        assert_eq!(ids, vec!["o5"]);

        // Guests pass the new-user check unconditionally
        let eligible = find_eligible_auto_offers(&db, Money::from_pence(20000), None, now)
            .await
            .unwrap();
        let ids: Vec<&str> = eligible.iter().map(|e| e.offer.id.as_str()).collect();
        assert_eq!(ids, vec!["o4", "o5"]);
    }

    #[tokio::test]
    async fn test_empty_cart_has_no_eligible_offers() {
        let db = fresh_db().await;
        db.offers()
            .create(&{
                let mut o = offer("o1", "FREEBIE", DiscountType::Fixed, 100);
                o.min_order_amount = Money::zero();
                o
            })
            .await
            .unwrap();

        let eligible = find_eligible_auto_offers(&db, Money::zero(), None, Utc::now())
            .await
            .unwrap();
        assert!(eligible.is_empty());
    }

    #[tokio::test]
    async fn test_near_miss_reports_gap_and_potential() {
        let db = fresh_db().await;

        // £10 above a £110 subtotal, 10% off
        let mut close = offer("o1", "ALMOST", DiscountType::Percentage, 1000);
        close.min_order_amount = Money::from_pence(12000);
        db.offers().create(&close).await.unwrap();

        // Hidden from the cart screen
        let mut hidden = offer("o2", "SECRET", DiscountType::Fixed, 9000);
        hidden.min_order_amount = Money::from_pence(12500);
        hidden.show_in_cart = false;
        db.offers().create(&hidden).await.unwrap();

        // Beyond the £20 window
        let mut far = offer("o3", "FAR", DiscountType::Fixed, 9000);
        far.min_order_amount = Money::from_pence(20000);
        db.offers().create(&far).await.unwrap();

        let nudges = get_near_miss_offers(&db, Money::from_pence(11000), None)
            .await
            .unwrap();
        assert_eq!(nudges.len(), 1);
        assert_eq!(nudges[0].offer.code, "ALMOST");
        assert_eq!(nudges[0].gap_amount.pence(), 1000);
        // 10% of the £120 minimum
        assert_eq!(nudges[0].potential_discount.pence(), 1200);
    }

    #[tokio::test]
    async fn test_near_miss_skips_manual_only_offers() {
        let db = fresh_db().await;

        // Cart-visible, in the window, but only redeemable by entering a
        // code; nudging towards it would promise an automatic discount
        // the engine never applies
        let mut manual_only = offer("o1", "MANUALONLY", DiscountType::Percentage, 1000);
        manual_only.min_order_amount = Money::from_pence(11000);
        manual_only.auto_apply = false;
        db.offers().create(&manual_only).await.unwrap();

        let nudges = get_near_miss_offers(&db, Money::from_pence(10000), None)
            .await
            .unwrap();
        assert!(nudges.is_empty());
    }

    #[tokio::test]
    async fn test_near_miss_capped_and_sorted_by_minimum() {
        let db = fresh_db().await;
        for (i, min) in [10100, 10200, 10300, 10400].iter().enumerate() {
            let mut o = offer(
                &format!("o{i}"),
                &format!("NUDGE{i}"),
                DiscountType::Fixed,
                500,
            );
            o.min_order_amount = Money::from_pence(*min);
            db.offers().create(&o).await.unwrap();
        }

        let nudges = get_near_miss_offers(&db, Money::from_pence(10000), None)
            .await
            .unwrap();
        assert_eq!(nudges.len(), MAX_NEAR_MISS_OFFERS);
        let gaps: Vec<i64> = nudges.iter().map(|n| n.gap_amount.pence()).collect();
        assert_eq!(gaps, vec![100, 200, 300]);
    }
}

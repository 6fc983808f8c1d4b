//! # Offer Discount Math & Selection Rules
//!
//! Pure decision logic for the auto-apply engine. Everything here is
//! deterministic over its inputs; the I/O side (candidate queries, counter
//! increments, cart persistence) lives in atelier-engine.
//!
//! ## Decision Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  should_apply_offer(provenance, current, candidate)                     │
//! │                                                                         │
//! │  None           → apply                                                 │
//! │  ManualLocked   → never (hard veto)                                     │
//! │  Auto           → apply iff candidate > current (strict improvement)    │
//! │  ManualUnlocked → apply iff candidate ≥ current × 1.1                   │
//! │                                                                         │
//! │  The 10% bar on unlocked manual codes prevents flapping: the engine    │
//! │  only displaces a code the customer typed when the win is meaningful.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;

use crate::money::Money;
use crate::types::{DiscountProvenance, DiscountType, EligibleOffer, Offer};

/// Computes the discount an offer yields against an amount.
///
/// Percentage discounts round half-up to the penny. Fixed discounts are
/// capped at the amount they apply to - a discount can never exceed what
/// it discounts.
///
/// ## Example
/// ```rust
/// use atelier_core::money::Money;
/// use atelier_core::offers::calculate_offer_discount;
/// # use atelier_core::types::{Offer, DiscountType, ApplicableTo};
/// # use chrono::Utc;
/// # fn percentage_offer(bps: i64) -> Offer {
/// #     Offer {
/// #         id: "o".into(), code: "C".into(), description: None,
/// #         discount_type: DiscountType::Percentage, discount_value: bps,
/// #         min_order_amount: Money::zero(), valid_from: None, valid_to: None,
/// #         max_uses: None, used_count: 0, auto_apply: true, is_active: true,
/// #         priority: 0, applicable_to: ApplicableTo::All, show_in_cart: true,
/// #         auto_apply_count: 0, created_at: Utc::now(), updated_at: Utc::now(),
/// #     }
/// # }
/// let offer = percentage_offer(1000); // 10%
/// let discount = calculate_offer_discount(&offer, Money::from_pence(20000));
/// assert_eq!(discount.pence(), 2000); // £20.00
/// ```
pub fn calculate_offer_discount(offer: &Offer, amount: Money) -> Money {
    if !amount.is_positive() {
        return Money::zero();
    }
    match offer.discount_type {
        DiscountType::Percentage => amount.percentage_of(offer.discount_value as u32),
        DiscountType::Fixed => Money::from_pence(offer.discount_value).min(amount),
    }
}

/// Total ordering used for best-offer selection: calculated discount
/// descending, then priority descending, then offer id ascending.
///
/// The final id tie-break carries no business meaning - it only makes the
/// selection stable regardless of input order.
fn selection_order(a: &EligibleOffer, b: &EligibleOffer) -> Ordering {
    b.calculated_discount
        .cmp(&a.calculated_discount)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.offer.id.cmp(&b.offer.id))
}

/// Sorts an eligible list best-first, using the same ordering as
/// [`select_best_offer`]. Used for the cart's hint cache.
pub fn rank_offers(entries: &mut [EligibleOffer]) {
    entries.sort_by(selection_order);
}

/// Picks the best-value entry from an eligible list.
///
/// Returns `None` on empty input. The candidate query's priority sort is
/// advisory only; this re-sort by computed discount is authoritative.
pub fn select_best_offer(entries: &[EligibleOffer]) -> Option<&EligibleOffer> {
    entries.iter().min_by(|a, b| selection_order(a, b))
}

/// Resolves which of two optional entries wins.
///
/// Non-null beats null. Strictly greater discount wins; on an exact
/// discount tie, strictly greater priority wins; a tie on both keeps
/// `current` (no churn for no gain).
pub fn compare_offers<'a>(
    current: Option<&'a EligibleOffer>,
    candidate: Option<&'a EligibleOffer>,
) -> Option<&'a EligibleOffer> {
    match (current, candidate) {
        (None, None) => None,
        (Some(c), None) => Some(c),
        (None, Some(n)) => Some(n),
        (Some(c), Some(n)) => {
            match n.calculated_discount.cmp(&c.calculated_discount) {
                Ordering::Greater => Some(n),
                Ordering::Less => Some(c),
                Ordering::Equal => {
                    if n.priority > c.priority {
                        Some(n)
                    } else {
                        Some(c)
                    }
                }
            }
        }
    }
}

/// Minimum relative improvement a candidate needs to displace an unlocked
/// manual code: new ≥ current × 1.1, computed integer-exactly.
fn clears_manual_override_bar(candidate: Money, current: Money) -> bool {
    candidate.pence() * 10 >= current.pence() * 11
}

/// The decision gate: may `candidate` replace the cart's current discount?
pub fn should_apply_offer(
    provenance: DiscountProvenance,
    current_discount: Money,
    candidate: &EligibleOffer,
) -> bool {
    match provenance {
        DiscountProvenance::None => true,
        DiscountProvenance::ManualLocked => false,
        DiscountProvenance::Auto => candidate.calculated_discount > current_discount,
        DiscountProvenance::ManualUnlocked => {
            clears_manual_override_bar(candidate.calculated_discount, current_discount)
        }
    }
}

/// The auto-apply engine's verdict for one evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoOfferVerdict {
    /// Apply this entry, overwriting any existing discount.
    Apply(EligibleOffer),
    /// Remove the current discount: it was auto-applied and the cart no
    /// longer qualifies for anything.
    Clear,
    /// Leave the cart's discount exactly as it is.
    Keep,
}

/// Pure auto-apply decision over the cart's discount state and the best
/// eligible candidate.
///
/// Auto-applied discounts are not sticky: when eligibility evaporates
/// (e.g. the subtotal drops below every threshold) they are cleared.
/// Manual discounts are left untouched in the same situation.
pub fn decide_auto_offer(
    provenance: DiscountProvenance,
    current_discount: Money,
    best: Option<&EligibleOffer>,
) -> AutoOfferVerdict {
    // Locked carts are short-circuited by the caller; double-checked here
    // so the decision function is safe on its own.
    if provenance == DiscountProvenance::ManualLocked {
        return AutoOfferVerdict::Keep;
    }

    match best {
        None => {
            if provenance == DiscountProvenance::Auto {
                AutoOfferVerdict::Clear
            } else {
                AutoOfferVerdict::Keep
            }
        }
        Some(entry) => {
            if should_apply_offer(provenance, current_discount, entry) {
                AutoOfferVerdict::Apply(entry.clone())
            } else {
                AutoOfferVerdict::Keep
            }
        }
    }
}

/// The discount a customer would receive by spending exactly enough to
/// qualify for the offer. Used for near-miss nudges.
pub fn potential_discount(offer: &Offer) -> Money {
    calculate_offer_discount(offer, offer.min_order_amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

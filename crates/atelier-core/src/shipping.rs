//! # Shipping Fee Resolution & Order Pricing
//!
//! Tiered delivery fee lookup with a free-delivery threshold override,
//! plus the checkout-summary composition of shipping and VAT.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate_shipping_fee(order_total, settings)                          │
//! │                                                                         │
//! │  1. No settings?                     → £0 (soft default)               │
//! │  2. Threshold enabled and met?       → £0 (checked before tiers)       │
//! │  3. First tier with min ≤ t ≤ max?   → that tier's fee                 │
//! │  4. No tier matched (range gap)?     → fee of highest-max tier         │
//! │  5. No tiers at all?                 → £0                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DeliveryTier, Settings};
use crate::vat::{self, VatBreakdown};

/// Presentation-oriented delivery information for the cart screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTierInfo {
    /// Whether this order ships free.
    pub free_delivery: bool,

    /// The fee that applies when not free.
    pub fee: Money,

    /// How much more the customer must spend to reach free delivery,
    /// when a threshold is configured and not yet met.
    pub amount_to_free_delivery: Option<Money>,

    /// Human-readable summary for the cart UI.
    pub message: String,
}

/// Final order totals for the checkout summary.
///
/// Prices are VAT-inclusive throughout: `tax` is reported for display,
/// never added to the total.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,

    /// Net/VAT decomposition of the discounted goods amount.
    /// `breakdown.vat == tax` always.
    pub breakdown: VatBreakdown,
}

/// Resolves the delivery fee for an order total.
///
/// Missing settings and empty tier lists resolve to zero - shipping
/// configuration is promotional, and checkout must never fail over it.
pub fn calculate_shipping_fee(order_total: Money, settings: Option<&Settings>) -> Money {
    let Some(settings) = settings else {
        return Money::zero();
    };

    // Free delivery wins over any tier
    let threshold = &settings.free_delivery_threshold;
    if threshold.enabled && order_total >= threshold.amount {
        return Money::zero();
    }

    if settings.delivery_tiers.is_empty() {
        return Money::zero();
    }

    if let Some(tier) = matching_tier(order_total, &settings.delivery_tiers) {
        return tier.fee;
    }

    // Range gap: fall back to the tier with the highest upper bound,
    // treating an open-ended tier as the highest of all.
    settings
        .delivery_tiers
        .iter()
        .max_by_key(|t| t.max_amount.map(|m| m.pence()).unwrap_or(i64::MAX))
        .map(|t| t.fee)
        .unwrap_or_else(Money::zero)
}

/// First tier (in configured order) whose range contains the total.
fn matching_tier(order_total: Money, tiers: &[DeliveryTier]) -> Option<&DeliveryTier> {
    tiers.iter().find(|t| {
        order_total >= t.min_amount
            && t.max_amount.map(|max| order_total <= max).unwrap_or(true)
    })
}

/// Builds the delivery message shown in the cart.
///
/// Free-delivery messaging takes priority over tier messaging. When a
/// threshold is configured but not yet met, the gap to free delivery is
/// reported alongside the current fee.
pub fn delivery_tier_info(order_total: Money, settings: Option<&Settings>) -> DeliveryTierInfo {
    let fee = calculate_shipping_fee(order_total, settings);

    let threshold = settings
        .map(|s| &s.free_delivery_threshold)
        .filter(|t| t.enabled);

    if let Some(threshold) = threshold {
        if order_total >= threshold.amount {
            return DeliveryTierInfo {
                free_delivery: true,
                fee: Money::zero(),
                amount_to_free_delivery: None,
                message: "Your order qualifies for free delivery".to_string(),
            };
        }

        let gap = threshold.amount - order_total;
        return DeliveryTierInfo {
            free_delivery: false,
            fee,
            amount_to_free_delivery: Some(gap),
            message: format!("Spend {gap} more for free delivery"),
        };
    }

    DeliveryTierInfo {
        free_delivery: fee.is_zero(),
        fee,
        amount_to_free_delivery: None,
        message: if fee.is_zero() {
            "Free delivery".to_string()
        } else {
            format!("Delivery fee: {fee}")
        },
    }
}

/// Composes shipping and VAT extraction into the final order totals.
///
/// `total = max(0, subtotal - discount) + shipping`. VAT is already
/// embedded in these VAT-inclusive amounts and is reported, not added.
/// When settings are absent or VAT is disabled, tax reports zero.
pub fn calculate_order_pricing(
    subtotal: Money,
    discount: Money,
    settings: Option<&Settings>,
) -> OrderPricing {
    let after_discount = subtotal.subtract_clamped(discount);
    let shipping = calculate_shipping_fee(after_discount, settings);

    let rate = match settings {
        Some(s) if s.vat_enabled => s.vat_rate,
        Some(_) => crate::money::VatRate::zero(),
        // No settings row yet: report VAT at the standard rate
        None => crate::money::STANDARD_VAT_RATE,
    };
    let breakdown = vat::decompose(after_discount, rate);

    OrderPricing {
        subtotal,
        discount,
        shipping,
        tax: breakdown.vat,
        total: after_discount + shipping,
        breakdown,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

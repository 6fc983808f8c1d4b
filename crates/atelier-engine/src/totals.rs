//! # Checkout Totals
//!
//! Loads the shipping/VAT settings and composes the order summary.
//! Missing settings are a soft default, never a failure: a storefront
//! whose administrator hasn't configured shipping still checks out.

use tracing::debug;

use atelier_core::shipping::{calculate_order_pricing, delivery_tier_info};
use atelier_core::{DeliveryTierInfo, Money, OrderPricing};
use atelier_db::Database;

use crate::error::EngineResult;

/// The full checkout summary: totals plus the delivery message.
#[derive(Debug, Clone)]
pub struct OrderTotals {
    pub pricing: OrderPricing,
    pub delivery: DeliveryTierInfo,
}

/// Computes the checkout summary for a discounted subtotal.
pub async fn order_totals(
    db: &Database,
    subtotal: Money,
    discount: Money,
) -> EngineResult<OrderTotals> {
    let settings = db.settings().get().await?;
    debug!(
        subtotal = %subtotal,
        discount = %discount,
        configured = settings.is_some(),
        "Computing order totals"
    );

    let pricing = calculate_order_pricing(subtotal, discount, settings.as_ref());
    let delivery = delivery_tier_info(subtotal.subtract_clamped(discount), settings.as_ref());

    Ok(OrderTotals { pricing, delivery })
}

// =============================================================================
// Unit Tests
// =============================================================================

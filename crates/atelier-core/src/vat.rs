//! # VAT Decomposition
//!
//! All catalog prices are VAT-inclusive: VAT is *extracted* for display,
//! never added on top.
//!
//! ## The Extraction Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Gross price already contains VAT:                                      │
//! │                                                                         │
//! │     gross = net × (1 + rate)                                           │
//! │  ⇒  vat   = gross × rate / (1 + rate)                                  │
//! │                                                                         │
//! │  At the 20% standard rate this collapses to the well-known shortcut:   │
//! │                                                                         │
//! │     vat = gross × 0.20 / 1.20 = gross / 6                              │
//! │                                                                         │
//! │  The general formula is the source of truth. The fixed-rate entry      │
//! │  points delegate to it at STANDARD_VAT_RATE, so shortcut and formula   │
//! │  can never disagree.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, VatRate, STANDARD_VAT_RATE};
use crate::types::CartItem;

/// A gross amount decomposed into its net and VAT components.
///
/// Invariant: `net + vat == gross` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VatBreakdown {
    pub gross: Money,
    pub net: Money,
    pub vat: Money,
    pub rate: VatRate,
}

/// Per-component VAT breakdown for a configured cart line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemVatBreakdown {
    pub material: VatBreakdown,
    pub size: VatBreakdown,
    pub finishes: VatBreakdown,
    pub packaging: VatBreakdown,
    pub unit_price: VatBreakdown,
    pub line_total: VatBreakdown,
}

/// Extracts the VAT portion embedded in a gross amount at the given rate.
///
/// `amount × bps / (10000 + bps)` with half-up rounding. This is the
/// general formula every other VAT function delegates to.
///
/// ## Example
/// ```rust
/// use atelier_core::money::{Money, VatRate};
/// use atelier_core::vat::extract_vat;
///
/// // £12.00 gross at 20% contains £2.00 VAT
/// let vat = extract_vat(Money::from_pence(1200), VatRate::from_bps(2000));
/// assert_eq!(vat.pence(), 200);
/// ```
pub fn extract_vat(amount: Money, rate: VatRate) -> Money {
    if rate.is_zero() || !amount.is_positive() {
        return Money::zero();
    }
    let denom = 10000 + rate.bps() as i128;
    let vat = (amount.pence() as i128 * rate.bps() as i128 + denom / 2) / denom;
    Money::from_pence(vat as i64)
}

/// Decomposes a gross amount at the given rate.
pub fn decompose(gross: Money, rate: VatRate) -> VatBreakdown {
    let vat = extract_vat(gross, rate);
    VatBreakdown {
        gross,
        net: gross - vat,
        vat,
        rate,
    }
}

/// Decomposes a VAT-inclusive amount at the fixed 20% standard rate.
///
/// Zero and negative amounts decompose to all-zero components.
///
/// ## Example
/// ```rust
/// use atelier_core::money::Money;
/// use atelier_core::vat::from_gross;
///
/// let breakdown = from_gross(Money::from_pence(1200));
/// assert_eq!(breakdown.vat.pence(), 200);  // £12.00 / 6
/// assert_eq!(breakdown.net.pence(), 1000);
/// ```
pub fn from_gross(gross: Money) -> VatBreakdown {
    if !gross.is_positive() {
        return VatBreakdown {
            gross: Money::zero(),
            net: Money::zero(),
            vat: Money::zero(),
            rate: STANDARD_VAT_RATE,
        };
    }
    decompose(gross, STANDARD_VAT_RATE)
}

/// Decomposes each price component of a cart line independently.
///
/// Each of the four components (material, size, finishes, packaging) goes
/// through the gross formula on its own, then the unit price and line
/// total are decomposed separately for the order summary.
pub fn item_breakdown(item: &CartItem) -> ItemVatBreakdown {
    ItemVatBreakdown {
        material: from_gross(item.breakdown.material),
        size: from_gross(item.breakdown.size),
        finishes: from_gross(item.breakdown.finishes),
        packaging: from_gross(item.breakdown.packaging),
        unit_price: from_gross(item.unit_price),
        line_total: from_gross(item.line_total()),
    }
}

/// VAT embedded in a discounted cart subtotal at the standard rate.
///
/// The discount is taken off first and the result clamped at zero - a
/// discount can never produce negative VAT.
pub fn cart_vat(subtotal: Money, discount: Money) -> Money {
    extract_vat(subtotal.subtract_clamped(discount), STANDARD_VAT_RATE)
}

// =============================================================================
// Unit Tests
// =============================================================================

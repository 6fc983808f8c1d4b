//! # Domain Types
//!
//! Core domain types used throughout Atelier Commerce.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Offer      │   │      Cart       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  code (display) │   │  items[]        │       │
//! │  │  materials[]    │   │  discount rule  │   │  discount state │       │
//! │  │  finishes[]     │   │  validity/caps  │   │  hint cache     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountType   │   │  ApplicableTo   │   │ DiscountMethod  │       │
//! │  │  Percentage     │   │  All            │   │  None           │       │
//! │  │  Fixed          │   │  NewUsers       │   │  Auto / Manual  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount Provenance
//! The cart's discount state is stored as three legacy fields
//! (`is_auto_applied`, `discount_method`, `manual_code_locked`) for
//! compatibility with the document shape the storefront already persists.
//! All decision logic goes through [`Cart::provenance`], which collapses the
//! valid combinations into the explicit [`DiscountProvenance`] enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, VatRate, STANDARD_VAT_RATE};

// =============================================================================
// Catalog
// =============================================================================

/// A size option available for a material, priced as an add-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SizeOption {
    /// Size in millimetres. The business identifier for a size.
    pub size_mm: u32,

    /// Price add-on for this size.
    pub price: Money,
}

/// A material a product can be made from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Business identifier (stable across renames).
    pub material_id: String,

    /// Display name, matched case-insensitively when no id is supplied.
    pub name: String,

    /// Base price when this material is selected.
    pub price: Money,

    /// Sizes available for this material.
    #[serde(default)]
    pub size_options: Vec<SizeOption>,
}

/// A finish a product can be treated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Finish {
    /// Business identifier.
    pub finish_id: String,

    /// Display name.
    pub name: String,

    /// Price add-on for this finish.
    pub price: Money,
}

/// A configurable product in the catalog.
///
/// Materials and finishes are stored as JSON documents alongside the
/// product row, mirroring the document-store heritage of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Fallback base price when a material carries no price of its own.
    pub base_price: Money,

    /// Price add-on for premium packaging.
    pub packaging_price: Money,

    /// Materials this product can be configured with.
    pub materials: Vec<Material>,

    /// Finishes this product can be configured with.
    pub finishes: Vec<Finish>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Offers
// =============================================================================

/// How an offer's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is basis points off the subtotal (1000 = 10%).
    Percentage,
    /// `discount_value` is pence off, capped at the subtotal.
    Fixed,
}

/// Which customer segment an offer applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApplicableTo {
    /// Everyone.
    All,
    /// Guests, and authenticated users with no completed orders.
    NewUsers,
}

/// A promotional offer.
///
/// ## Lifecycle
/// Created and edited by administrators. Usage counters are incremented
/// atomically on application. Never physically deleted by this logic -
/// soft-toggled via `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display code shown to the customer (e.g. "AUTUMN10").
    pub code: String,

    /// Optional marketing description.
    pub description: Option<String>,

    /// Percentage or fixed-amount discount.
    pub discount_type: DiscountType,

    /// Basis points for percentage offers, pence for fixed offers.
    pub discount_value: i64,

    /// Minimum cart subtotal required to qualify.
    pub min_order_amount: Money,

    /// Start of the validity window (open-ended if absent).
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window (open-ended if absent).
    #[ts(as = "Option<String>")]
    pub valid_to: Option<DateTime<Utc>>,

    /// Usage cap across all carts (unlimited if absent).
    pub max_uses: Option<i64>,

    /// How many times the offer has been redeemed.
    pub used_count: i64,

    /// Whether the auto-apply engine may select this offer.
    pub auto_apply: bool,

    /// Soft-delete flag.
    pub is_active: bool,

    /// Administrator-assigned tie-breaker; higher wins.
    pub priority: i64,

    /// Segment eligibility.
    pub applicable_to: ApplicableTo,

    /// Whether to surface this offer as a near-miss nudge in the cart.
    pub show_in_cart: bool,

    /// How many times the auto-apply engine has applied this offer.
    pub auto_apply_count: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Whether the offer's validity window has started at `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        match self.valid_from {
            Some(from) => now >= from,
            None => true,
        }
    }

    /// Whether the offer's validity window has ended at `now`.
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        match self.valid_to {
            Some(to) => now > to,
            None => false,
        }
    }

    /// Whether `now` falls inside the validity window.
    /// Open-ended bounds are treated as always valid.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        self.has_started(now) && !self.has_expired(now)
    }

    /// Whether the usage cap has been reached. Absent cap = unlimited.
    pub fn usage_cap_reached(&self) -> bool {
        match self.max_uses {
            Some(max) => self.used_count >= max,
            None => false,
        }
    }
}

/// An offer that survived eligibility filtering, with its computed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EligibleOffer {
    pub offer: Offer,

    /// Discount this offer would yield against the current subtotal.
    pub calculated_discount: Money,

    /// Copied from the offer for sorting convenience.
    pub priority: i64,
}

/// Compact form of [`EligibleOffer`] cached on the cart as a UI hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EligibleOfferHint {
    pub offer_id: String,
    pub calculated_discount: Money,
    pub priority: i64,
}

impl From<&EligibleOffer> for EligibleOfferHint {
    fn from(entry: &EligibleOffer) -> Self {
        EligibleOfferHint {
            offer_id: entry.offer.id.clone(),
            calculated_discount: entry.calculated_discount,
            priority: entry.priority,
        }
    }
}

/// An offer the customer almost qualifies for, shown to encourage spend.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NearMissOffer {
    pub offer: Offer,

    /// How much more the customer must spend to qualify.
    pub gap_amount: Money,

    /// The discount they would receive by spending just enough to qualify.
    pub potential_discount: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// How the cart's current discount came to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMethod {
    /// No discount applied.
    None,
    /// Applied by the auto-apply engine.
    Auto,
    /// Entered by the customer as a code.
    Manual,
}

impl Default for DiscountMethod {
    fn default() -> Self {
        DiscountMethod::None
    }
}

/// The cart's discount state collapsed into its four valid combinations.
///
/// The three stored fields admit nonsense combinations (auto AND locked);
/// every decision in the offer engine is written against this enum so the
/// valid states are explicit rather than implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountProvenance {
    /// No discount on the cart.
    None,
    /// Discount was applied by the auto-apply engine.
    Auto,
    /// Customer-entered code the engine may replace for a clear improvement.
    ManualUnlocked,
    /// Customer-entered code the engine must never touch.
    ManualLocked,
}

/// A priced component breakdown for a configured line item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub material: Money,
    pub size: Money,
    pub finishes: Money,
    pub packaging: Money,
}

/// A configured product in the cart.
///
/// Uses the snapshot pattern: the priced breakdown is frozen at the moment
/// the configuration is validated, so later catalog edits don't silently
/// reprice a customer's cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (UUID).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub product_name: String,

    /// Resolved material name (frozen).
    pub material_name: String,

    /// Selected size, when one was chosen.
    pub size_mm: Option<u32>,

    /// Selected finish ids.
    pub finish_ids: Vec<String>,

    /// Component prices at time of adding (frozen).
    pub breakdown: PriceBreakdown,

    /// Unit price at time of adding (frozen).
    pub unit_price: Money,

    /// Quantity in cart.
    pub quantity: i64,

    /// Whether premium packaging was included.
    pub include_packaging: bool,

    /// When this item was added to cart.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Calculates the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart, including its discount state.
///
/// ## Invariants
/// - `manual_code_locked && discount_method == Manual` ⇒ the auto-apply
///   engine never overwrites the discount.
/// - `is_auto_applied == true` ⇒ `discount_method == Auto`.
/// - `subtotal` is derived from items; callers recompute after mutation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning user, absent for guest carts.
    pub user_id: Option<String>,

    /// Configured items.
    pub items: Vec<CartItem>,

    /// Sum of line totals (derived).
    pub subtotal: Money,

    /// Display code of the applied discount, if any.
    pub discount_code: Option<String>,

    /// Amount of the applied discount.
    pub discount_amount: Money,

    /// The applied offer, if any.
    pub offer_id: Option<String>,

    /// True if the current discount came from the auto-apply engine.
    pub is_auto_applied: bool,

    /// How the current discount was applied.
    pub discount_method: DiscountMethod,

    /// True if the customer explicitly pinned a manual code.
    pub manual_code_locked: bool,

    /// Cached hint list of offers the cart currently qualifies for.
    pub eligible_auto_offers: Vec<EligibleOfferHint>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(id: impl Into<String>, user_id: Option<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: id.into(),
            user_id,
            items: Vec::new(),
            subtotal: Money::zero(),
            discount_code: None,
            discount_amount: Money::zero(),
            offer_id: None,
            is_auto_applied: false,
            discount_method: DiscountMethod::None,
            manual_code_locked: false,
            eligible_auto_offers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Recomputes the subtotal from the line items.
    pub fn recompute_subtotal(&mut self) {
        self.subtotal = self.items.iter().map(CartItem::line_total).sum();
    }

    /// Collapses the stored discount fields into the explicit state enum.
    ///
    /// A cart with no `offer_id` has no discount regardless of what the
    /// other fields claim. A manual method wins over the auto flag.
    pub fn provenance(&self) -> DiscountProvenance {
        if self.offer_id.is_none() {
            return DiscountProvenance::None;
        }
        match self.discount_method {
            DiscountMethod::Manual => {
                if self.manual_code_locked {
                    DiscountProvenance::ManualLocked
                } else {
                    DiscountProvenance::ManualUnlocked
                }
            }
            _ => DiscountProvenance::Auto,
        }
    }

    /// Records an auto-applied offer on the cart.
    pub fn apply_auto_offer(&mut self, offer: &Offer, discount: Money) {
        self.discount_code = Some(offer.code.clone());
        self.discount_amount = discount;
        self.offer_id = Some(offer.id.clone());
        self.is_auto_applied = true;
        self.discount_method = DiscountMethod::Auto;
        self.updated_at = Utc::now();
    }

    /// Records a customer-entered code on the cart.
    pub fn apply_manual_code(&mut self, offer: &Offer, discount: Money, locked: bool) {
        self.discount_code = Some(offer.code.clone());
        self.discount_amount = discount;
        self.offer_id = Some(offer.id.clone());
        self.is_auto_applied = false;
        self.discount_method = DiscountMethod::Manual;
        self.manual_code_locked = locked;
        self.updated_at = Utc::now();
    }

    /// Removes the discount entirely.
    pub fn clear_discount(&mut self) {
        self.discount_code = None;
        self.discount_amount = Money::zero();
        self.offer_id = None;
        self.is_auto_applied = false;
        self.discount_method = DiscountMethod::None;
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Orders
// =============================================================================

/// The status of an order. Cancelled orders don't count towards the
/// new-user eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A placed order. Only the slice needed by the offer engine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Settings
// =============================================================================

/// Free-delivery threshold configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FreeDeliveryThreshold {
    pub enabled: bool,
    pub amount: Money,
}

/// A delivery fee tier. `max_amount` absent = no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTier {
    pub min_amount: Money,
    pub max_amount: Option<Money>,
    pub fee: Money,
}

/// Shipping and VAT configuration, maintained by administrators.
///
/// Absent settings are never a hard failure: checkout degrades to zero
/// shipping and standard-rate VAT reporting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub vat_enabled: bool,

    /// Configured VAT rate in basis points.
    pub vat_rate: VatRate,

    pub free_delivery_threshold: FreeDeliveryThreshold,

    /// Scanned in order; first matching tier wins.
    pub delivery_tiers: Vec<DeliveryTier>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            vat_enabled: true,
            vat_rate: STANDARD_VAT_RATE,
            free_delivery_threshold: FreeDeliveryThreshold {
                enabled: false,
                amount: Money::zero(),
            },
            delivery_tiers: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn offer_base() -> Offer {
        Offer {
            id: "offer-1".to_string(),
            code: "AUTUMN10".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: 1000,
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
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_offer_window_open_ended() {
        let offer = offer_base();
        assert!(offer.is_within_window(Utc::now()));
    }

    #[test]
    fn test_offer_window_bounds() {
        let now = Utc::now();
        let mut offer = offer_base();

        offer.valid_from = Some(now + Duration::hours(1));
        assert!(!offer.is_within_window(now));

        offer.valid_from = Some(now - Duration::hours(2));
        offer.valid_to = Some(now - Duration::hours(1));
        assert!(!offer.is_within_window(now));

        offer.valid_to = Some(now + Duration::hours(1));
        assert!(offer.is_within_window(now));
    }

    #[test]
    fn test_offer_usage_cap() {
        let mut offer = offer_base();
        assert!(!offer.usage_cap_reached());

        offer.max_uses = Some(5);
        offer.used_count = 4;
        assert!(!offer.usage_cap_reached());

        offer.used_count = 5;
        assert!(offer.usage_cap_reached());
    }

    #[test]
    fn test_cart_provenance_none_without_offer() {
        let mut cart = Cart::new("cart-1", None);
        // Even with stale flags, no offer_id means no discount
        cart.is_auto_applied = true;
        cart.manual_code_locked = true;
        assert_eq!(cart.provenance(), DiscountProvenance::None);
    }

    #[test]
    fn test_cart_provenance_states() {
        let offer = offer_base();
        let mut cart = Cart::new("cart-1", None);

        cart.apply_auto_offer(&offer, Money::from_pence(500));
        assert_eq!(cart.provenance(), DiscountProvenance::Auto);
        assert!(cart.is_auto_applied);
        assert_eq!(cart.discount_method, DiscountMethod::Auto);

        cart.apply_manual_code(&offer, Money::from_pence(500), false);
        assert_eq!(cart.provenance(), DiscountProvenance::ManualUnlocked);
        assert!(!cart.is_auto_applied);

        cart.apply_manual_code(&offer, Money::from_pence(500), true);
        assert_eq!(cart.provenance(), DiscountProvenance::ManualLocked);

        cart.clear_discount();
        assert_eq!(cart.provenance(), DiscountProvenance::None);
        assert_eq!(cart.discount_amount, Money::zero());
        assert!(cart.discount_code.is_none());
    }

    #[test]
    fn test_cart_subtotal() {
        let mut cart = Cart::new("cart-1", None);
        cart.items.push(CartItem {
            product_id: "p1".to_string(),
            product_name: "Brass Lever Handle".to_string(),
            material_name: "Brass".to_string(),
            size_mm: None,
            finish_ids: vec![],
            breakdown: PriceBreakdown::default(),
            unit_price: Money::from_pence(10000),
            quantity: 2,
            include_packaging: false,
            added_at: Utc::now(),
        });
        cart.recompute_subtotal();
        assert_eq!(cart.subtotal.pence(), 20000);
    }
}

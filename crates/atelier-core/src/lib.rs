//! # atelier-core: Pure Pricing & Promotion Logic
//!
//! This crate is the **heart** of the storefront pricing engine. It contains
//! all pricing, VAT, shipping, and offer-selection logic as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pricing Engine Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   atelier-engine (Orchestration)                │   │
//! │  │   price & validate ──► auto-apply offers ──► order totals      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atelier-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │   offers  │  │   │
//! │  │   │  Product  │  │   Money   │  │ validate &│  │ eligibility│  │   │
//! │  │   │   Offer   │  │  VatRate  │  │  compose  │  │ & selection│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │    vat    │  │  shipping │                                 │   │
//! │  │   │ extraction│  │   tiers   │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   atelier-db (Database Layer)                   │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Offer, Cart, Settings, etc.)
//! - [`money`] - Money in pence and VAT rates in basis points (no floats!)
//! - [`error`] - Domain error types
//! - [`pricing`] - Configuration validation and price composition
//! - [`vat`] - VAT extraction from VAT-inclusive amounts
//! - [`shipping`] - Tiered delivery fees and order totals
//! - [`offers`] - Offer discount math, selection, and the auto-apply gate
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are pence (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use atelier_core::money::{Money, STANDARD_VAT_RATE};
//! use atelier_core::vat::extract_vat;
//!
//! // Create money from pence (never from floats!)
//! let price = Money::from_pence(12000); // £120.00
//!
//! // Prices are VAT-inclusive: extract the embedded 20% VAT
//! let vat = extract_vat(price, STANDARD_VAT_RATE);
//! assert_eq!(vat.pence(), 2000); // £20.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod offers;
pub mod pricing;
pub mod shipping;
pub mod types;
pub mod vat;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atelier_core::Money` instead of
// `use atelier_core::money::Money`

pub use error::{CoreError, CoreResult};
pub use money::{Money, VatRate, STANDARD_VAT_RATE};
pub use offers::AutoOfferVerdict;
pub use pricing::{ConfigurationRequest, PricedConfiguration, SelectedMaterial};
pub use shipping::{DeliveryTierInfo, OrderPricing};
pub use types::*;
pub use vat::{ItemVatBreakdown, VatBreakdown};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How close a cart subtotal must be to an offer's minimum order amount
/// for the offer to surface as a near-miss nudge (£20.00).
///
/// ## Why a constant?
/// The nudge window is a merchandising decision, not per-offer data.
/// Keeping it here makes the "spend £X more" banner consistent across
/// every offer until it graduates to a settings field.
pub const NEAR_MISS_GAP: Money = Money::from_pence(2000);

/// Maximum number of near-miss offers surfaced in the cart at once.
///
/// ## Why a constant?
/// More than a few nudges at a time reads as spam. The cart shows the
/// closest few and drops the rest.
pub const MAX_NEAR_MISS_OFFERS: usize = 3;

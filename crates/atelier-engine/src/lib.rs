//! # atelier-engine: Orchestration for the Atelier Pricing Engine
//!
//! This crate wires the pure logic in atelier-core to the persistence in
//! atelier-db. Each public operation is an async function a storefront
//! request handler calls directly.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pricing Engine Architecture                        │
//! │                                                                         │
//! │  Storefront request handlers                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ atelier-engine (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌──────────────────┐  │   │
//! │  │   │    pricing    │  │    offers     │  │      totals      │  │   │
//! │  │   │ validate &    │  │ auto-apply    │  │ shipping + VAT   │  │   │
//! │  │   │ price configs │  │ & near-miss   │  │ order summary    │  │   │
//! │  │   └───────┬───────┘  └───────┬───────┘  └────────┬─────────┘  │   │
//! │  │           │                  │                   │            │   │
//! │  │           ▼                  ▼                   ▼            │   │
//! │  │   atelier-core (pure decisions) + atelier-db (persistence)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - Fetch-then-price configuration validation
//! - [`offers`] - Eligibility, the auto-apply pass, near-miss nudges
//! - [`totals`] - Checkout totals with settings-backed shipping and VAT
//! - [`error`] - Engine error type with HTTP status mapping

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod offers;
pub mod pricing;
pub mod totals;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{EngineError, EngineResult, ErrorCode};
pub use offers::{apply_best_auto_offer, find_eligible_auto_offers, get_near_miss_offers};
pub use pricing::compute_price_and_validate;
pub use totals::{order_totals, OrderTotals};

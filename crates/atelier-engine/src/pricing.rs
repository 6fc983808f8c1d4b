//! # Pricing Operations
//!
//! Fetches the product and delegates to the pure configuration pricer.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  compute_price_and_validate(db, request)                                 │
//! │                                                                         │
//! │  1. Fetch product by request.product_id                                 │
//! │       ├── missing row        → 404 Product not found                    │
//! │       └── is_active = false  → 404 (retired products price nothing)    │
//! │  2. Validate + compose in atelier-core                                  │
//! │       ├── bad material/size/finish → 400 INVALID_SELECTION              │
//! │       └── ok → PricedConfiguration                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use atelier_core::pricing;
use atelier_core::{ConfigurationRequest, PricedConfiguration, Product};
use atelier_db::Database;

use crate::error::EngineResult;
use crate::EngineError;

/// Loads an active product or fails with 404.
///
/// Inactive products are indistinguishable from missing ones to callers;
/// a retired product must not keep pricing.
pub async fn get_active_product(db: &Database, product_id: &str) -> EngineResult<Product> {
    let product = db
        .products()
        .get_by_id(product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| EngineError::not_found("Product", product_id))?;

    Ok(product)
}

/// Validates a requested configuration and returns its composed price.
pub async fn compute_price_and_validate(
    db: &Database,
    request: &ConfigurationRequest,
) -> EngineResult<PricedConfiguration> {
    debug!(product_id = %request.product_id, "Pricing configuration");

    let product = get_active_product(db, &request.product_id).await?;
    let priced = pricing::price_configuration(&product, request)?;

    Ok(priced)
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Configuration Pricing & Validation
//!
//! Validates a requested product configuration (material, size, finishes)
//! against the product's allowed option set and composes the unit/total
//! price. Pricing never guesses: any component outside the catalog's
//! allowed set is a hard validation failure, not a silent default.
//!
//! ## Price Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit_price = material + size + finishes + packaging                    │
//! │                                                                         │
//! │  material  ← caller's base_price override, else catalog material price │
//! │  size      ← matched size option add-on (zero when no size requested)  │
//! │  finishes  ← sum of matched finish add-ons                             │
//! │  packaging ← product.packaging_price when include_packaging            │
//! │                                                                         │
//! │  total_amount = unit_price × quantity  (quantity defaults to 1)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Material, PriceBreakdown, Product};

/// How the caller identifies the material they want.
///
/// An explicit id wins; otherwise the display name is matched
/// case-insensitively (legacy clients send names, newer ones send ids).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedMaterial {
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A requested product configuration to validate and price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRequest {
    pub product_id: String,

    pub selected_material: SelectedMaterial,

    /// Requested size in millimetres; only validated when present.
    #[serde(default)]
    pub selected_size: Option<u32>,

    /// Requested finish ids; every one must exist in the catalog.
    #[serde(default)]
    pub selected_finishes: Vec<String>,

    /// Defaults to 1 when absent or non-positive (legacy coercion).
    #[serde(default)]
    pub quantity: Option<i64>,

    #[serde(default)]
    pub include_packaging: bool,

    /// Optional material price override supplied by the caller (used by
    /// quote flows); falls back to the catalog price.
    #[serde(default)]
    pub base_price: Option<Money>,
}

/// A validated, fully priced configuration.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedConfiguration {
    /// Component price breakdown.
    pub breakdown: PriceBreakdown,

    /// Sum of the breakdown components.
    pub unit_price: Money,

    /// `unit_price × quantity`.
    pub total_amount: Money,

    /// Effective quantity after legacy coercion.
    pub quantity: i64,

    pub include_packaging: bool,

    /// The material that matched, returned for caller convenience.
    pub resolved_material: Material,
}

/// Validates the requested configuration against the product's allowed
/// option set and composes the price. Read-only against the catalog.
///
/// ## Failures
/// - [`CoreError::MaterialNotAvailable`] - no material matched
/// - [`CoreError::SizeNotAvailable`] - size requested but not offered
///   by the matched material
/// - [`CoreError::FinishNotAvailable`] - a requested finish id is not
///   in the product's finishes
pub fn price_configuration(
    product: &Product,
    request: &ConfigurationRequest,
) -> CoreResult<PricedConfiguration> {
    let material = resolve_material(product, &request.selected_material)?;

    let size_cost = match request.selected_size {
        Some(requested_mm) => {
            let option = material
                .size_options
                .iter()
                .find(|s| s.size_mm == requested_mm)
                .ok_or(CoreError::SizeNotAvailable {
                    material: material.name.clone(),
                    requested_mm,
                })?;
            option.price
        }
        None => Money::zero(),
    };

    let mut finish_cost = Money::zero();
    for finish_id in &request.selected_finishes {
        let finish = product
            .finishes
            .iter()
            .find(|f| &f.finish_id == finish_id)
            .ok_or_else(|| CoreError::FinishNotAvailable {
                requested: finish_id.clone(),
            })?;
        finish_cost += finish.price;
    }

    // Caller override wins; catalog price is the fallback
    let material_cost = request.base_price.unwrap_or(material.price);

    let packaging_cost = if request.include_packaging {
        product.packaging_price
    } else {
        Money::zero()
    };

    let breakdown = PriceBreakdown {
        material: material_cost,
        size: size_cost,
        finishes: finish_cost,
        packaging: packaging_cost,
    };
    let unit_price = material_cost + size_cost + finish_cost + packaging_cost;

    // Legacy quantity coercion: absent or non-positive falls back to 1
    let quantity = match request.quantity {
        Some(q) if q > 0 => q,
        _ => 1,
    };

    Ok(PricedConfiguration {
        breakdown,
        unit_price,
        total_amount: unit_price.multiply_quantity(quantity),
        quantity,
        include_packaging: request.include_packaging,
        resolved_material: material.clone(),
    })
}

/// Matches the requested material: id equality when an id was supplied,
/// otherwise case-insensitive name equality.
fn resolve_material<'a>(
    product: &'a Product,
    selected: &SelectedMaterial,
) -> CoreResult<&'a Material> {
    if let Some(id) = &selected.material_id {
        return product
            .materials
            .iter()
            .find(|m| &m.material_id == id)
            .ok_or_else(|| CoreError::MaterialNotAvailable {
                requested: id.clone(),
            });
    }

    if let Some(name) = &selected.name {
        return product
            .materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::MaterialNotAvailable {
                requested: name.clone(),
            });
    }

    Err(CoreError::MaterialNotAvailable {
        requested: String::new(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Finish, SizeOption};
    use chrono::Utc;

    fn test_product() -> Product {
        Product {
            id: "prod-1".to_string(),
            sku: "HANDLE-LVR-01".to_string(),
            name: "Lever Handle".to_string(),
            description: None,
            base_price: Money::from_pence(8000),
            packaging_price: Money::from_pence(500),
            materials: vec![
                Material {
                    material_id: "mat-brass".to_string(),
                    name: "Brass".to_string(),
                    price: Money::from_pence(10000),
                    size_options: vec![
                        SizeOption {
                            size_mm: 128,
                            price: Money::from_pence(0),
                        },
                        SizeOption {
                            size_mm: 224,
                            price: Money::from_pence(1500),
                        },
                    ],
                },
                Material {
                    material_id: "mat-bronze".to_string(),
                    name: "Bronze".to_string(),
                    price: Money::from_pence(12000),
                    size_options: vec![],
                },
            ],
            finishes: vec![
                Finish {
                    finish_id: "fin-satin".to_string(),
                    name: "Satin".to_string(),
                    price: Money::from_pence(800),
                },
                Finish {
                    finish_id: "fin-aged".to_string(),
                    name: "Aged".to_string(),
                    price: Money::from_pence(1200),
                },
            ],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request_for(material_name: &str) -> ConfigurationRequest {
        ConfigurationRequest {
            product_id: "prod-1".to_string(),
            selected_material: SelectedMaterial {
                material_id: None,
                name: Some(material_name.to_string()),
            },
            selected_size: None,
            selected_finishes: vec![],
            quantity: None,
            include_packaging: false,
            base_price: None,
        }
    }

    #[test]
    fn test_material_base_price_qty_two() {
        // Material at £100, no size, no finishes, quantity 2, no packaging
        let product = test_product();
        let mut request = request_for("Brass");
        request.quantity = Some(2);

        let priced = price_configuration(&product, &request).unwrap();
        assert_eq!(priced.unit_price.pence(), 10000);
        assert_eq!(priced.total_amount.pence(), 20000);
        assert_eq!(priced.resolved_material.material_id, "mat-brass");
    }

    #[test]
    fn test_material_matched_case_insensitively() {
        let product = test_product();
        let priced = price_configuration(&product, &request_for("bRaSs")).unwrap();
        assert_eq!(priced.resolved_material.name, "Brass");
    }

    #[test]
    fn test_material_matched_by_id_when_supplied() {
        let product = test_product();
        let mut request = request_for("ignored");
        request.selected_material = SelectedMaterial {
            material_id: Some("mat-bronze".to_string()),
            name: Some("Brass".to_string()), // id wins over name
        };

        let priced = price_configuration(&product, &request).unwrap();
        assert_eq!(priced.resolved_material.material_id, "mat-bronze");
        assert_eq!(priced.unit_price.pence(), 12000);
    }

    #[test]
    fn test_unknown_material_rejected() {
        let product = test_product();
        let err = price_configuration(&product, &request_for("Teak")).unwrap_err();
        assert!(matches!(err, CoreError::MaterialNotAvailable { .. }));
    }

    #[test]
    fn test_size_validated_against_matched_material() {
        let product = test_product();

        let mut request = request_for("Brass");
        request.selected_size = Some(224);
        let priced = price_configuration(&product, &request).unwrap();
        assert_eq!(priced.unit_price.pence(), 11500); // 10000 + 1500

        // Bronze offers no sizes: requesting one fails
        let mut request = request_for("Bronze");
        request.selected_size = Some(224);
        let err = price_configuration(&product, &request).unwrap_err();
        assert!(matches!(err, CoreError::SizeNotAvailable { .. }));
    }

    #[test]
    fn test_size_not_checked_when_not_requested() {
        let product = test_product();
        let priced = price_configuration(&product, &request_for("Bronze")).unwrap();
        assert_eq!(priced.breakdown.size, Money::zero());
    }

    #[test]
    fn test_finishes_summed_and_validated() {
        let product = test_product();

        let mut request = request_for("Brass");
        request.selected_finishes =
            vec!["fin-satin".to_string(), "fin-aged".to_string()];
        let priced = price_configuration(&product, &request).unwrap();
        assert_eq!(priced.breakdown.finishes.pence(), 2000);
        assert_eq!(priced.unit_price.pence(), 12000);

        request.selected_finishes = vec!["fin-chrome".to_string()];
        let err = price_configuration(&product, &request).unwrap_err();
        assert!(matches!(err, CoreError::FinishNotAvailable { .. }));
    }

    #[test]
    fn test_packaging_adds_exactly_packaging_price() {
        let product = test_product();

        let without = price_configuration(&product, &request_for("Brass")).unwrap();

        let mut request = request_for("Brass");
        request.include_packaging = true;
        let with = price_configuration(&product, &request).unwrap();

        assert_eq!(
            (with.unit_price - without.unit_price),
            product.packaging_price
        );
    }

    #[test]
    fn test_base_price_override_wins() {
        let product = test_product();
        let mut request = request_for("Brass");
        request.base_price = Some(Money::from_pence(9000));

        let priced = price_configuration(&product, &request).unwrap();
        assert_eq!(priced.breakdown.material.pence(), 9000);
    }

    #[test]
    fn test_quantity_coercion() {
        let product = test_product();

        let mut request = request_for("Brass");
        request.quantity = Some(0);
        let priced = price_configuration(&product, &request).unwrap();
        assert_eq!(priced.quantity, 1);

        request.quantity = None;
        let priced = price_configuration(&product, &request).unwrap();
        assert_eq!(priced.quantity, 1);
    }

    #[test]
    fn test_missing_material_selector_rejected() {
        let product = test_product();
        let mut request = request_for("Brass");
        request.selected_material = SelectedMaterial::default();
        let err = price_configuration(&product, &request).unwrap_err();
        assert!(matches!(err, CoreError::MaterialNotAvailable { .. }));
    }
}

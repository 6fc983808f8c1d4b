//! # Error Types
//!
//! Domain-specific error types for atelier-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  atelier-core errors (this file)                                       │
//! │  └── CoreError        - Catalog / configuration rule violations        │
//! │                                                                         │
//! │  atelier-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  atelier-engine errors (separate crate)                                │
//! │  └── EngineError      - What HTTP handlers see (status + message)      │
//! │                                                                         │
//! │  Flow: CoreError → EngineError (400/404) / DbError → EngineError (500) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, material name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Selection failures name exactly what was requested - pricing must
//!    never guess at an unauthorized configuration

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Selection errors map to HTTP 400 at the engine boundary; missing
/// products map to 404. The offer engine itself never raises these -
/// absent promotional configuration degrades to safe no-op behavior.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product doesn't exist or was soft-deleted.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested material doesn't match any of the product's materials.
    ///
    /// Matching is by `material_id` equality when an id was supplied,
    /// otherwise case-insensitive name equality.
    #[error("Material '{requested}' is not available for this product")]
    MaterialNotAvailable { requested: String },

    /// Requested size doesn't match any size option of the matched material.
    #[error("Size {requested_mm}mm is not available in {material}")]
    SizeNotAvailable {
        material: String,
        requested_mm: u32,
    },

    /// A requested finish id is not in the product's allowed finishes.
    #[error("Finish '{requested}' is not available for this product")]
    FinishNotAvailable { requested: String },
}

impl CoreError {
    /// Whether this error is a bad-request-class selection failure (as
    /// opposed to a missing resource).
    pub fn is_invalid_selection(&self) -> bool {
        !matches!(self, CoreError::ProductNotFound(_))
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::SizeNotAvailable {
            material: "Brass".to_string(),
            requested_mm: 305,
        };
        assert_eq!(err.to_string(), "Size 305mm is not available in Brass");

        let err = CoreError::ProductNotFound("prod-1".to_string());
        assert_eq!(err.to_string(), "Product not found: prod-1");
    }

    #[test]
    fn test_selection_classification() {
        assert!(!CoreError::ProductNotFound("x".to_string()).is_invalid_selection());
        assert!(CoreError::MaterialNotAvailable {
            requested: "Teak".to_string()
        }
        .is_invalid_selection());
    }
}

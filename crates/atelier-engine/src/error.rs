//! # Engine Error Type
//!
//! Unified error type for engine operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Error Flow in the Pricing Engine                        │
//! │                                                                         │
//! │  Storefront handler            Engine                                   │
//! │  ──────────────────            ──────                                   │
//! │                                                                         │
//! │  POST /price                                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Engine operation                                                │  │
//! │  │  Result<T, EngineError>                                          │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ──── DbError::QueryFailed("...") ──┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Selection Error? ─── CoreError::SizeNotAvailable ─ EngineError │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  handler maps EngineError::status() → HTTP status, body = message      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use atelier_core::CoreError;
use atelier_db::DbError;

/// Engine error surfaced to request handlers.
///
/// ## Serialization
/// This is what the storefront receives when an operation fails:
/// ```json
/// {
///   "code": "INVALID_SELECTION",
///   "message": "Size 305mm is not available in Brass"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for engine responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// A requested configuration component is not allowed (400)
    InvalidSelection,

    /// Input validation failed (400)
    ValidationError,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal error (500)
    Internal,
}

impl EngineError {
    /// Creates a new engine error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        EngineError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        EngineError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::Internal, message)
    }

    /// The HTTP status code this error maps to.
    pub fn status(&self) -> u16 {
        match self.code {
            ErrorCode::NotFound => 404,
            ErrorCode::InvalidSelection | ErrorCode::ValidationError => 400,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

/// Converts database errors to engine errors.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => EngineError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                EngineError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Document serialization failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Stored document is invalid")
            }
            DbError::PoolExhausted => {
                EngineError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to engine errors.
///
/// Selection failures are client mistakes (400); a missing product is 404.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductNotFound(id) => EngineError::not_found("Product", id),
            CoreError::MaterialNotAvailable { .. }
            | CoreError::SizeNotAvailable { .. }
            | CoreError::FinishNotAvailable { .. } => {
                EngineError::new(ErrorCode::InvalidSelection, err.to_string())
            }
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(EngineError::not_found("Product", "p1").status(), 404);
        assert_eq!(EngineError::validation("bad input").status(), 400);
        assert_eq!(EngineError::internal("boom").status(), 500);

        let selection: EngineError = CoreError::MaterialNotAvailable {
            requested: "Teak".to_string(),
        }
        .into();
        assert_eq!(selection.code, ErrorCode::InvalidSelection);
        assert_eq!(selection.status(), 400);

        let missing: EngineError = CoreError::ProductNotFound("p1".to_string()).into();
        assert_eq!(missing.status(), 404);
    }
}

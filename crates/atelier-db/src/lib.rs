//! # atelier-db: Database Layer for the Atelier Pricing Engine
//!
//! This crate provides database access for the pricing and offer engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pricing Engine Data Flow                            │
//! │                                                                         │
//! │  Engine operation (apply_best_auto_offer)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    atelier-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (offer.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ OfferRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ CartRepo      │    │ ...          │  │   │
//! │  │   │ Management    │    │ ProductRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, JSON document columns)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, offer, cart, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atelier_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/atelier.db")).await?;
//!
//! let product = db.products().get_by_id("uuid-here").await?;
//! let offers = db.offers().find_auto_apply_candidates(subtotal).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::offer::OfferRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;

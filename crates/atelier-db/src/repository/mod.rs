//! # Repository Module
//!
//! Database repository implementations for the pricing engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                          │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine operation                                                       │
//! │       │                                                                 │
//! │       │  db.offers().find_auto_apply_candidates(subtotal)              │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OfferRepository                                                        │
//! │  ├── find_auto_apply_candidates(&self, subtotal)                       │
//! │  ├── find_near_miss_window(&self, subtotal, gap)                       │
//! │  ├── increment_auto_apply_count(&self, id)                             │
//! │  └── ...                                                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test against an in-memory database                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog reads and writes
//! - [`offer::OfferRepository`] - Offer queries and atomic counters
//! - [`cart::CartRepository`] - Cart document persistence
//! - [`order::OrderRepository`] - Order writes and the new-user count
//! - [`settings::SettingsRepository`] - Single-row shipping/VAT config

pub mod cart;
pub mod offer;
pub mod order;
pub mod product;
pub mod settings;

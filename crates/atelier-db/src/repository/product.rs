//! # Product Repository
//!
//! Database operations for the configurable catalog.
//!
//! ## Document Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How a Product Row Maps to the Domain Type                   │
//! │                                                                         │
//! │  products table                       Product                           │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │  │ id, sku, name, ...       │──────► │ scalar fields            │      │
//! │  │ base_price_pence INTEGER │──────► │ base_price: Money        │      │
//! │  │ materials TEXT (JSON)    │──────► │ materials: Vec<Material> │      │
//! │  │ finishes  TEXT (JSON)    │──────► │ finishes: Vec<Finish>    │      │
//! │  └──────────────────────────┘        └──────────────────────────┘      │
//! │                                                                         │
//! │  The option documents are small (a handful of materials per product)   │
//! │  and always read whole, so JSON columns beat a normalized join.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use atelier_core::{Finish, Material, Money, Product};

/// Database row shape for a product. Converted to/from [`Product`] at the
/// repository boundary so the domain type never sees pence columns or JSON.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    description: Option<String>,
    base_price_pence: i64,
    packaging_price_pence: i64,
    materials: String,
    finishes: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> DbResult<Product> {
        let materials: Vec<Material> = serde_json::from_str(&self.materials)?;
        let finishes: Vec<Finish> = serde_json::from_str(&self.finishes)?;

        Ok(Product {
            id: self.id,
            sku: self.sku,
            name: self.name,
            description: self.description,
            base_price: Money::from_pence(self.base_price_pence),
            packaging_price: Money::from_pence(self.packaging_price_pence),
            materials,
            finishes,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT
                id, sku, name, description,
                base_price_pence, packaging_price_pence,
                materials, finishes, is_active,
                created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT
                id, sku, name, description,
                base_price_pence, packaging_price_pence,
                materials, finishes, is_active,
                created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Inserts a new product.
    pub async fn create(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        let materials = serde_json::to_string(&product.materials)?;
        let finishes = serde_json::to_string(&product.finishes)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description,
                base_price_pence, packaging_price_pence,
                materials, finishes, is_active,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.base_price.pence())
        .bind(product.packaging_price.pence())
        .bind(materials)
        .bind(finishes)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product in place. The `updated_at` stamp comes
    /// from the caller so admin edits and migrations stay distinguishable.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let materials = serde_json::to_string(&product.materials)?;
        let finishes = serde_json::to_string(&product.finishes)?;

        sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                description = ?4,
                base_price_pence = ?5,
                packaging_price_pence = ?6,
                materials = ?7,
                finishes = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.base_price.pence())
        .bind(product.packaging_price.pence())
        .bind(materials)
        .bind(finishes)
        .bind(product.is_active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-deletes a product. The row stays so existing cart and order
    /// snapshots keep resolving, but pricing refuses inactive products.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atelier_core::SizeOption;

    fn sample_product() -> Product {
        let now = Utc::now();
        Product {
            id: "prod-1".to_string(),
            sku: "PULL-BAR-01".to_string(),
            name: "Bar Pull".to_string(),
            description: Some("Solid bar pull".to_string()),
            base_price: Money::from_pence(6000),
            packaging_price: Money::from_pence(400),
            materials: vec![Material {
                material_id: "mat-brass".to_string(),
                name: "Brass".to_string(),
                price: Money::from_pence(7500),
                size_options: vec![SizeOption {
                    size_mm: 160,
                    price: Money::from_pence(500),
                }],
            }],
            finishes: vec![Finish {
                finish_id: "fin-satin".to_string(),
                name: "Satin".to_string(),
                price: Money::from_pence(600),
            }],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrips_documents() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.create(&sample_product()).await.unwrap();

        let fetched = repo.get_by_id("prod-1").await.unwrap().unwrap();
        assert_eq!(fetched.sku, "PULL-BAR-01");
        assert_eq!(fetched.base_price.pence(), 6000);
        assert_eq!(fetched.materials.len(), 1);
        assert_eq!(fetched.materials[0].size_options[0].size_mm, 160);
        assert_eq!(fetched.finishes[0].price.pence(), 600);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let found = db.products().get_by_id("nope").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_active_excludes_inactive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut active = sample_product();
        repo.create(&active).await.unwrap();

        let mut retired = sample_product();
        retired.id = "prod-2".to_string();
        retired.sku = "PULL-BAR-02".to_string();
        retired.is_active = false;
        repo.create(&retired).await.unwrap();

        let listed = repo.list_active(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "prod-1");

        active.is_active = false;
        repo.update(&active).await.unwrap();
        assert!(repo.list_active(10).await.unwrap().is_empty());
    }
}

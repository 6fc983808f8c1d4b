//! # Settings Repository
//!
//! The single-row shipping and VAT configuration. The row id is pinned to 1
//! by a CHECK constraint; `get` returns `None` until an administrator has
//! saved settings for the first time, and callers degrade to defaults.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use atelier_core::{DeliveryTier, FreeDeliveryThreshold, Money, Settings, VatRate};

/// Database row shape for settings.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    vat_enabled: bool,
    vat_rate_bps: i64,
    free_delivery_enabled: bool,
    free_delivery_amount_pence: i64,
    delivery_tiers: String,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn into_settings(self) -> DbResult<Settings> {
        let delivery_tiers: Vec<DeliveryTier> = serde_json::from_str(&self.delivery_tiers)?;

        Ok(Settings {
            vat_enabled: self.vat_enabled,
            vat_rate: VatRate::from_bps(self.vat_rate_bps as u32),
            free_delivery_threshold: FreeDeliveryThreshold {
                enabled: self.free_delivery_enabled,
                amount: Money::from_pence(self.free_delivery_amount_pence),
            },
            delivery_tiers,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for the settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets the settings, if an administrator has saved any.
    pub async fn get(&self) -> DbResult<Option<Settings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT
                vat_enabled, vat_rate_bps,
                free_delivery_enabled, free_delivery_amount_pence,
                delivery_tiers, updated_at
            FROM settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(SettingsRow::into_settings).transpose()
    }

    /// Upserts the settings row.
    pub async fn save(&self, settings: &Settings) -> DbResult<()> {
        debug!(vat_enabled = settings.vat_enabled, "Saving settings");

        let tiers = serde_json::to_string(&settings.delivery_tiers)?;

        sqlx::query(
            r#"
            INSERT INTO settings (
                id, vat_enabled, vat_rate_bps,
                free_delivery_enabled, free_delivery_amount_pence,
                delivery_tiers, updated_at
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                vat_enabled = excluded.vat_enabled,
                vat_rate_bps = excluded.vat_rate_bps,
                free_delivery_enabled = excluded.free_delivery_enabled,
                free_delivery_amount_pence = excluded.free_delivery_amount_pence,
                delivery_tiers = excluded.delivery_tiers,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(settings.vat_enabled)
        .bind(settings.vat_rate.bps() as i64)
        .bind(settings.free_delivery_threshold.enabled)
        .bind(settings.free_delivery_threshold.amount.pence())
        .bind(tiers)
        .bind(settings.updated_at)
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

    #[tokio::test]
    async fn test_get_returns_none_before_first_save() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.settings().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_get_roundtrips_tiers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        let mut settings = Settings::default();
        settings.free_delivery_threshold = FreeDeliveryThreshold {
            enabled: true,
            amount: Money::from_pence(10000),
        };
        settings.delivery_tiers = vec![DeliveryTier {
            min_amount: Money::zero(),
            max_amount: Some(Money::from_pence(9999)),
            fee: Money::from_pence(495),
        }];
        repo.save(&settings).await.unwrap();

        let fetched = repo.get().await.unwrap().unwrap();
        assert!(fetched.vat_enabled);
        assert_eq!(fetched.vat_rate.bps(), 2000);
        assert!(fetched.free_delivery_threshold.enabled);
        assert_eq!(fetched.delivery_tiers.len(), 1);
        assert_eq!(fetched.delivery_tiers[0].fee.pence(), 495);
    }

    #[tokio::test]
    async fn test_second_save_replaces_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        repo.save(&Settings::default()).await.unwrap();

        let mut updated = Settings::default();
        updated.vat_enabled = false;
        updated.vat_rate = VatRate::from_bps(500);
        repo.save(&updated).await.unwrap();

        let fetched = repo.get().await.unwrap().unwrap();
        assert!(!fetched.vat_enabled);
        assert_eq!(fetched.vat_rate.bps(), 500);
    }
}

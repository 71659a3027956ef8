//! Product lookup response cache
//!
//! Stores the raw catalog payload per barcode so repeated lookups of the same
//! product are served from the local store.

use shelfaware_common::{time, Result};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct ProductCache {
    pool: SqlitePool,
}

impl ProductCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Cached payload for `barcode`
    pub async fn get(&self, barcode: &str) -> Result<Option<String>> {
        let payload = sqlx::query_scalar::<_, String>(
            "SELECT payload FROM product_cache WHERE barcode = ?",
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payload)
    }

    /// Store or replace the payload for `barcode`
    pub async fn put(&self, barcode: &str, payload: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO product_cache (barcode, payload, cached_at)
            VALUES (?, ?, ?)
            ON CONFLICT(barcode) DO UPDATE SET
                payload = excluded.payload,
                cached_at = excluded.cached_at
            "#,
        )
        .bind(barcode)
        .bind(payload)
        .bind(time::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// src/services/settings.rs
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Setting not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
struct CachedSetting {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Database-backed settings with a short-lived read cache.
/// Falls back to environment variables for keys not present in the database,
/// so a bare deployment works from `.env` alone.
#[derive(Debug)]
pub struct SettingsService {
    db_pool: SqlitePool,
    cache: Arc<RwLock<HashMap<String, CachedSetting>>>,
    cache_ttl: Duration,
}

impl SettingsService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl: Duration::minutes(5),
        }
    }

    /// Get a setting value by key
    /// Falls back to environment variable if not found in database
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(key) {
                if cached.expires_at > Utc::now() {
                    debug!(key = %key, "Setting retrieved from cache");
                    return Ok(Some(cached.value.clone()));
                }
            }
        }

        // Query database
        let result = sqlx::query_as::<_, (String,)>(
            "SELECT value FROM system_settings WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.db_pool)
        .await?;

        let value = match result {
            Some((value,)) => Some(value),
            None => env::var(key.to_uppercase()).ok().filter(|v| !v.is_empty()),
        };

        if let Some(ref value) = value {
            let mut cache = self.cache.write().await;
            cache.insert(
                key.to_string(),
                CachedSetting {
                    value: value.clone(),
                    expires_at: Utc::now() + self.cache_ttl,
                },
            );
        }

        Ok(value)
    }

    /// Get multiple settings in one call
    pub async fn get_settings(
        &self,
        keys: &[&str],
    ) -> Result<HashMap<String, Option<String>>, SettingsError> {
        let mut out = HashMap::new();
        for key in keys {
            out.insert(key.to_string(), self.get_setting(key).await?);
        }
        Ok(out)
    }

    /// Upsert a setting value and refresh the cache
    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: &str,
    ) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, updated_at, updated_by)
            VALUES (?, ?, datetime('now'), ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .execute(&self.db_pool)
        .await?;

        let mut cache = self.cache.write().await;
        cache.insert(
            key.to_string(),
            CachedSetting {
                value: value.to_string(),
                expires_at: Utc::now() + self.cache_ttl,
            },
        );

        Ok(())
    }

    /// Drop a key from the cache (used after out-of-band writes)
    pub async fn invalidate(&self, key: &str) {
        let mut cache = self.cache.write().await;
        cache.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::common::migrations::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_set_then_get_setting() {
        let service = SettingsService::new(test_pool().await);
        service
            .set_setting("pdf_render_api_key", "key-123", "test")
            .await
            .unwrap();
        let value = service.get_setting("pdf_render_api_key").await.unwrap();
        assert_eq!(value.as_deref(), Some("key-123"));
    }

    #[tokio::test]
    async fn test_missing_setting_is_none() {
        let service = SettingsService::new(test_pool().await);
        let value = service.get_setting("no_such_key_here").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let service = SettingsService::new(test_pool().await);
        service.set_setting("storage_type", "local", "test").await.unwrap();
        service.set_setting("storage_type", "s3", "test").await.unwrap();
        let value = service.get_setting("storage_type").await.unwrap();
        assert_eq!(value.as_deref(), Some("s3"));
    }
}

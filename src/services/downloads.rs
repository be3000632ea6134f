// src/services/downloads.rs
//
// Download analytics. Tracking is log-and-continue by contract: a failed
// insert must never fail or block the export that triggered it.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::common::generate_download_id;

/// Export modes that produce a download record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    Pdf,
    Print,
    Images,
    Summary,
}

impl DownloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::Pdf => "pdf",
            DownloadFormat::Print => "print",
            DownloadFormat::Images => "images",
            DownloadFormat::Summary => "summary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(DownloadFormat::Pdf),
            "print" => Some(DownloadFormat::Print),
            "images" => Some(DownloadFormat::Images),
            "summary" => Some(DownloadFormat::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct DownloadRecord {
    pub id: String,
    pub portfolio_id: String,
    pub format: String,
    pub created_date: String,
}

#[derive(Debug)]
pub struct DownloadTrackingService {
    pool: SqlitePool,
}

impl DownloadTrackingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record one export. Never fails the caller: errors are logged and dropped.
    pub async fn track(&self, portfolio_id: &str, format: DownloadFormat) {
        let id = generate_download_id();
        let result = sqlx::query(
            r#"
            INSERT INTO portfolio_downloads (id, portfolio_id, format, created_date)
            VALUES (?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&id)
        .bind(portfolio_id)
        .bind(format.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(portfolio_id = %portfolio_id, format = %format.as_str(), "Download tracked");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    portfolio_id = %portfolio_id,
                    format = %format.as_str(),
                    "Failed to track download, continuing"
                );
            }
        }
    }

    /// List download records, newest first, optionally for one portfolio
    pub async fn list(
        &self,
        portfolio_id: Option<&str>,
    ) -> Result<Vec<DownloadRecord>, sqlx::Error> {
        match portfolio_id {
            Some(id) => {
                sqlx::query_as::<_, DownloadRecord>(
                    "SELECT * FROM portfolio_downloads WHERE portfolio_id = ? ORDER BY created_date DESC",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, DownloadRecord>(
                    "SELECT * FROM portfolio_downloads ORDER BY created_date DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_service() -> DownloadTrackingService {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::common::migrations::run_migrations(&pool).await.unwrap();
        DownloadTrackingService::new(pool)
    }

    #[test]
    fn test_format_round_trip() {
        for format in [
            DownloadFormat::Pdf,
            DownloadFormat::Print,
            DownloadFormat::Images,
            DownloadFormat::Summary,
        ] {
            assert_eq!(DownloadFormat::parse(format.as_str()), Some(format));
        }
        assert_eq!(DownloadFormat::parse("csv"), None);
    }

    #[tokio::test]
    async fn test_track_and_list() {
        let service = test_service().await;
        service.track("P_ABC123", DownloadFormat::Pdf).await;
        service.track("P_ABC123", DownloadFormat::Print).await;
        service.track("P_OTHER1", DownloadFormat::Images).await;

        let records = service.list(Some("P_ABC123")).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.portfolio_id == "P_ABC123"));

        let all = service.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_track_failure_is_swallowed() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        // No migrations: the insert will fail, but track must not panic
        let service = DownloadTrackingService::new(pool);
        service.track("P_ABC123", DownloadFormat::Summary).await;
    }
}

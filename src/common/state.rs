// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::{
    CareerBriefService, DownloadTrackingService, ExtractionService, PdfRenderService,
    ScreenshotService, SettingsService, StorageService,
};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub uploads_dir: PathBuf,
    pub http: Client,
    pub jwt_secret: String,
    /// Service-level key for Zapier-facing automation, distinct from user sessions
    pub service_api_key: Option<String>,
    /// Public origin used to build summary URLs handed to render services
    pub public_base_url: String,
    pub settings_service: Arc<SettingsService>,
    pub storage_service: Arc<StorageService>,
    pub extraction_service: Arc<ExtractionService>,
    pub pdf_render_service: Arc<PdfRenderService>,
    pub screenshot_service: Arc<ScreenshotService>,
    pub brief_service: Arc<CareerBriefService>,
    pub download_service: Arc<DownloadTrackingService>,
}

#[cfg(test)]
impl AppState {
    /// State over a migrated in-memory database with no external keys
    /// configured, so every optional service reports unconfigured.
    pub async fn for_tests() -> Self {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::common::migrations::run_migrations(&pool)
            .await
            .expect("migrations");

        let http = Client::new();
        let settings_service = Arc::new(SettingsService::new(pool.clone()));
        let uploads_dir = std::env::temp_dir().join("portfolio_api_tests");
        let public_base_url = "http://localhost:5173".to_string();

        AppState {
            db: pool.clone(),
            uploads_dir: uploads_dir.clone(),
            http: http.clone(),
            jwt_secret: "test-secret".to_string(),
            service_api_key: Some("test-service-key".to_string()),
            public_base_url: public_base_url.clone(),
            storage_service: Arc::new(StorageService::new(
                settings_service.clone(),
                uploads_dir,
                public_base_url,
            )),
            extraction_service: Arc::new(ExtractionService::new(settings_service.clone())),
            pdf_render_service: Arc::new(PdfRenderService::new(
                settings_service.clone(),
                http.clone(),
            )),
            screenshot_service: Arc::new(ScreenshotService::new(
                settings_service.clone(),
                http,
            )),
            brief_service: Arc::new(CareerBriefService::new()),
            download_service: Arc::new(DownloadTrackingService::new(pool)),
            settings_service,
        }
    }
}

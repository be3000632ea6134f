// src/main.rs
use axum::{extract::Extension, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod candidates;
mod common;
mod exports;
mod integrations;
mod leads;
mod portfolios;
mod services;

use common::AppState;
use services::{
    CareerBriefService, DownloadTrackingService, ExtractionService, PdfRenderService,
    ScreenshotService, SettingsService, StorageService,
};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://portfolio_api.db".to_string());
    let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let jwt_secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());
    let service_api_key = env::var("SERVICE_API_KEY").ok();
    let public_base_url =
        env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

    if service_api_key.is_none() {
        info!("SERVICE_API_KEY not set; Zapier endpoints will reject all callers");
    }

    // ========================================================================
    // DIRECTORY SETUP
    // ========================================================================

    tokio::fs::create_dir_all(&uploads_dir).await?;

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().no_proxy().build()?;

    let settings_service = Arc::new(SettingsService::new(pool.clone()));
    info!("SettingsService initialized");

    let storage_service = Arc::new(StorageService::new(
        settings_service.clone(),
        PathBuf::from(&uploads_dir),
        public_base_url.clone(),
    ));
    info!("StorageService initialized");

    let extraction_service = Arc::new(ExtractionService::new(settings_service.clone()));
    info!("ExtractionService initialized");

    let pdf_render_service = Arc::new(PdfRenderService::new(
        settings_service.clone(),
        http_client.clone(),
    ));
    info!("PdfRenderService initialized");

    let screenshot_service = Arc::new(ScreenshotService::new(
        settings_service.clone(),
        http_client.clone(),
    ));
    info!("ScreenshotService initialized");

    let brief_service = Arc::new(CareerBriefService::new());
    info!("CareerBriefService initialized");

    let download_service = Arc::new(DownloadTrackingService::new(pool.clone()));
    info!("DownloadTrackingService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        uploads_dir: PathBuf::from(uploads_dir),
        http: http_client,
        jwt_secret,
        service_api_key,
        public_base_url,
        settings_service,
        storage_service,
        extraction_service,
        pdf_render_service,
        screenshot_service,
        brief_service,
        download_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // ====================================================================
        // PORTFOLIO ROUTES (Ingestion, Records, Templates)
        // ====================================================================
        .merge(portfolios::portfolios_routes())
        // ====================================================================
        // EXPORT ROUTES (PDF, Summary, Images, Download Tracking)
        // ====================================================================
        .merge(exports::exports_routes())
        // ====================================================================
        // CANDIDATE ROUTES (Scoring, Interviews)
        // ====================================================================
        .merge(candidates::candidates_routes())
        // ====================================================================
        // INTEGRATION ROUTES (Zapier, Career Briefs)
        // ====================================================================
        .merge(integrations::integrations_routes())
        // ====================================================================
        // LEAD ROUTES (Leads, Package Inquiries)
        // ====================================================================
        .merge(leads::leads_routes())
        // ====================================================================
        // LOCAL UPLOAD SERVING
        // ====================================================================
        .merge(common::uploads::uploads_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(Extension(shared.clone()))
        // Portfolios are shared by link; every route answers cross-origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

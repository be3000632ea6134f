// src/exports/handlers.rs

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::AuthedUser;
use crate::common::{generate_raw_id, ApiError, AppState};
use crate::portfolios::models::{Portfolio, PortfolioRow};
use crate::services::downloads::{DownloadFormat, DownloadRecord};
use crate::services::pdf_render::PdfRenderOptions;

use super::capture::{capture_sections, SectionRenderer};
use super::summary::{build_summary_slides, Slide};

/// Summary page URL: the render source for PDF and section capture, and the
/// manual fallback target
fn summary_page_url(base: &str, portfolio_id: &str) -> String {
    format!("{}/PortfolioSummary?id={}", base, portfolio_id)
}

async fn fetch_portfolio(
    db: &sqlx::SqlitePool,
    portfolio_id: &str,
) -> Result<Portfolio, ApiError> {
    sqlx::query_as::<_, PortfolioRow>("SELECT * FROM salespeople WHERE id = ?")
        .bind(portfolio_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .map(PortfolioRow::into_portfolio)
        .ok_or_else(|| ApiError::NotFound("Portfolio not found".to_string()))
}

fn pdf_filename(portfolio: &Portfolio) -> String {
    let name = portfolio
        .full_name
        .as_deref()
        .unwrap_or("portfolio")
        .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "_");
    format!("{}_portfolio.pdf", name)
}

/// Fallback payload returned with HTTP 200 when direct PDF rendering is not
/// possible. The client drives the browser print dialog from the summary URL.
#[derive(Debug, Serialize)]
pub struct ExportFallback {
    pub success: bool,
    pub fallback: &'static str,
    pub summary_url: String,
}

// ============================================================================
// PDF Export
// ============================================================================

/// POST /api/portfolios/:id/pdf - Direct PDF export
///
/// Renders the summary page through the external render service. Missing
/// configuration and upstream failures both degrade to the print fallback
/// with a 200 response; a hard error here would strand the user.
pub async fn export_pdf(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(portfolio_id): Path<String>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await;
    let portfolio = fetch_portfolio(&state.db, &portfolio_id).await?;

    let summary_url = summary_page_url(&state.public_base_url, &portfolio_id);

    match state
        .pdf_render_service
        .render_url(&summary_url, &PdfRenderOptions::default())
        .await
    {
        Ok(bytes) => {
            state
                .download_service
                .track(&portfolio_id, DownloadFormat::Pdf)
                .await;

            let disposition = format!("attachment; filename=\"{}\"", pdf_filename(&portfolio));
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        Err(e) => {
            warn!(
                error = %e,
                portfolio_id = %portfolio_id,
                "Direct PDF export unavailable, falling back to print"
            );

            state
                .download_service
                .track(&portfolio_id, DownloadFormat::Print)
                .await;

            Ok(Json(ExportFallback {
                success: false,
                fallback: "print",
                summary_url,
            })
            .into_response())
        }
    }
}

// ============================================================================
// Summary Export
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub portfolio_id: String,
    pub slides: Vec<Slide>,
}

/// GET /api/portfolios/:id/summary - Slide deck for the summary page
pub async fn export_summary(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(portfolio_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let state = state_lock.read().await;
    let portfolio = fetch_portfolio(&state.db, &portfolio_id).await?;

    let slides = build_summary_slides(&portfolio);

    state
        .download_service
        .track(&portfolio_id, DownloadFormat::Summary)
        .await;

    Ok(Json(SummaryResponse {
        portfolio_id,
        slides,
    }))
}

// ============================================================================
// Images Export
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SectionImage {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub success: bool,
    pub images: Vec<SectionImage>,
}

/// POST /api/portfolios/:id/images - Capture each summary section as PNG
///
/// Captured sections are uploaded to storage and returned as URLs; sections
/// that failed to capture or upload are dropped from the result. Without a
/// configured screenshot service the caller gets the summary URL for manual
/// capture and nothing is tracked.
pub async fn export_images(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(portfolio_id): Path<String>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await;
    let portfolio = fetch_portfolio(&state.db, &portfolio_id).await?;

    let summary_url = summary_page_url(&state.public_base_url, &portfolio_id);

    if !state.screenshot_service.is_configured().await {
        info!(portfolio_id = %portfolio_id, "Screenshot service not configured, manual capture fallback");
        return Ok(Json(ExportFallback {
            success: false,
            fallback: "manual",
            summary_url,
        })
        .into_response());
    }

    let sections: Vec<(String, String)> = build_summary_slides(&portfolio)
        .iter()
        .map(|slide| (slide.section_name().to_string(), slide.selector()))
        .collect();

    let renderer: &dyn SectionRenderer = state.screenshot_service.as_ref();
    let captured = capture_sections(renderer, &summary_url, &sections).await;

    let batch_id = generate_raw_id(8);
    let mut images = Vec::new();
    for section in captured {
        let Some(bytes) = section.image else { continue };
        let key = format!("captures/{}/{}-{}.png", portfolio_id, batch_id, section.name);
        match state.storage_service.upload(bytes, &key, "image/png").await {
            Ok(url) => images.push(SectionImage {
                name: section.name,
                url,
            }),
            Err(e) => {
                warn!(
                    error = %e,
                    section = %section.name,
                    "Captured section upload failed, dropping section"
                );
            }
        }
    }

    if !images.is_empty() {
        state
            .download_service
            .track(&portfolio_id, DownloadFormat::Images)
            .await;
    }

    info!(
        portfolio_id = %portfolio_id,
        uploaded = images.len(),
        "Section capture export finished"
    );

    Ok(Json(ImagesResponse {
        success: !images.is_empty(),
        images,
    })
    .into_response())
}

// ============================================================================
// Download Tracking
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TrackDownloadRequest {
    pub portfolio_id: String,
    pub format: String,
}

#[derive(Debug, Serialize)]
pub struct TrackDownloadResponse {
    pub success: bool,
}

/// POST /api/downloads - Record a client-initiated export
///
/// The print flow runs entirely in the browser, so the client reports it
/// here. Tracking failures are swallowed; the response is always success.
pub async fn track_download(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<TrackDownloadRequest>,
) -> Result<Json<TrackDownloadResponse>, ApiError> {
    let format = DownloadFormat::parse(&request.format).ok_or_else(|| {
        ApiError::BadRequest(format!("Unknown download format: {}", request.format))
    })?;

    let state = state_lock.read().await;
    state
        .download_service
        .track(&request.portfolio_id, format)
        .await;

    Ok(Json(TrackDownloadResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct DownloadFilters {
    pub portfolio_id: Option<String>,
}

/// GET /api/admin/downloads - Download analytics for the dashboard
pub async fn list_downloads(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Query(filters): Query<DownloadFilters>,
) -> Result<Json<Vec<DownloadRecord>>, ApiError> {
    let state = state_lock.read().await;

    let records = state
        .download_service
        .list(filters.portfolio_id.as_deref())
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn test_state() -> Arc<RwLock<AppState>> {
        let state = Arc::new(RwLock::new(AppState::for_tests().await));
        {
            let guard = state.read().await;
            sqlx::query(
                r#"
                INSERT INTO salespeople (id, full_name, title, summary, template)
                VALUES ('P_TEST01', 'Jane Doe', 'AE', 'Quota crusher', 'executive')
                "#,
            )
            .execute(&guard.db)
            .await
            .unwrap();
        }
        state
    }

    async fn tracked_formats(state: &Arc<RwLock<AppState>>) -> Vec<String> {
        let guard = state.read().await;
        guard
            .download_service
            .list(Some("P_TEST01"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.format)
            .collect()
    }

    #[tokio::test]
    async fn test_pdf_export_without_key_degrades_to_print_fallback() {
        let state = test_state().await;

        let response = export_pdf(Extension(state.clone()), Path("P_TEST01".to_string()))
            .await
            .unwrap();

        // Fallback is JSON with HTTP 200, never an empty binary body
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("application/json"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["fallback"], "print");
        assert_eq!(
            value["summary_url"],
            "http://localhost:5173/PortfolioSummary?id=P_TEST01"
        );

        assert_eq!(tracked_formats(&state).await, vec!["print"]);
    }

    #[tokio::test]
    async fn test_pdf_export_for_missing_record_is_not_found() {
        let state = test_state().await;
        let result = export_pdf(Extension(state), Path("P_MISSING".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_summary_export_returns_slides_and_tracks() {
        let state = test_state().await;

        let response = export_summary(Extension(state.clone()), Path("P_TEST01".to_string()))
            .await
            .unwrap();
        assert_eq!(response.0.portfolio_id, "P_TEST01");
        // Cover + dashboard (summary present) + contact
        let names: Vec<&str> = response.0.slides.iter().map(|s| s.section_name()).collect();
        assert_eq!(names, vec!["cover", "dashboard", "contact"]);

        assert_eq!(tracked_formats(&state).await, vec!["summary"]);
    }

    #[tokio::test]
    async fn test_images_export_without_key_offers_manual_capture() {
        let state = test_state().await;

        let response = export_images(Extension(state.clone()), Path("P_TEST01".to_string()))
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["fallback"], "manual");

        // Manual fallback is not a download
        assert!(tracked_formats(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_track_download_accepts_known_formats_only() {
        let state = test_state().await;

        let ok = track_download(
            Extension(state.clone()),
            Json(TrackDownloadRequest {
                portfolio_id: "P_TEST01".to_string(),
                format: "print".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(ok.0.success);

        let bad = track_download(
            Extension(state.clone()),
            Json(TrackDownloadRequest {
                portfolio_id: "P_TEST01".to_string(),
                format: "fax".to_string(),
            }),
        )
        .await;
        assert!(matches!(bad, Err(ApiError::BadRequest(_))));

        assert_eq!(tracked_formats(&state).await, vec!["print"]);
    }
}

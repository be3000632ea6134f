// src/services/pdf_render.rs
//
// Client for the hosted URL-to-PDF rendering service. The API key is optional
// configuration: when it is absent callers must degrade to the manual print
// fallback instead of treating the export as failed.

use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::services::settings::{SettingsError, SettingsService};

/// Fixed delay handed to the render service so client-side rendering settles
/// before capture. A tuning constant, not an adaptive timeout.
pub const RENDER_SETTLE_DELAY_MS: u64 = 5_000;

/// CSS injected into the rendered page: each top-level section prints on its
/// own page except the last, and animations are frozen for capture.
pub const PAGE_BREAK_CSS: &str = "\
section { page-break-after: always; break-after: page; } \
section:last-of-type { page-break-after: auto; break-after: auto; } \
* { animation: none !important; transition: none !important; }";

#[derive(Debug, Error)]
pub enum PdfRenderError {
    #[error("PDF rendering API key not configured")]
    NotConfigured,

    #[error("Render request failed: {0}")]
    RequestFailed(String),

    #[error("Render service returned HTTP {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Render service returned an empty document")]
    EmptyDocument,

    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfRenderOptions {
    pub landscape: bool,
    pub full_page: bool,
    pub print_background: bool,
    pub delay_ms: u64,
    pub css: String,
}

impl Default for PdfRenderOptions {
    fn default() -> Self {
        Self {
            landscape: true,
            full_page: true,
            print_background: true,
            delay_ms: RENDER_SETTLE_DELAY_MS,
            css: PAGE_BREAK_CSS.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    source: &'a str,
    landscape: bool,
    #[serde(rename = "use_print")]
    full_page: bool,
    print_background: bool,
    delay: u64,
    css: &'a str,
    format: &'a str,
}

#[derive(Debug)]
pub struct PdfRenderService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl PdfRenderService {
    pub fn new(settings_service: Arc<SettingsService>, client: Client) -> Self {
        Self {
            settings_service,
            client,
        }
    }

    /// Whether the external render service is usable at all
    pub async fn is_configured(&self) -> bool {
        matches!(
            self.settings_service.get_setting("pdf_render_api_key").await,
            Ok(Some(ref key)) if !key.is_empty()
        )
    }

    /// Render a public URL into PDF bytes via the external service.
    ///
    /// Returns `NotConfigured` when no API key is present; callers route that
    /// to the print fallback, never to an error page.
    pub async fn render_url(
        &self,
        url: &str,
        options: &PdfRenderOptions,
    ) -> Result<Bytes, PdfRenderError> {
        let api_key = self
            .settings_service
            .get_setting("pdf_render_api_key")
            .await?
            .filter(|key| !key.is_empty())
            .ok_or(PdfRenderError::NotConfigured)?;

        let endpoint = self
            .settings_service
            .get_setting("pdf_render_endpoint")
            .await?
            .unwrap_or_else(|| "https://api.pdfshift.io/v3/convert/pdf".to_string());

        let request = RenderRequest {
            source: url,
            landscape: options.landscape,
            full_page: options.full_page,
            print_background: options.print_background,
            delay: options.delay_ms,
            css: &options.css,
            format: "A4",
        };

        debug!(url = %url, delay_ms = options.delay_ms, "Requesting PDF render");

        let response = self
            .client
            .post(&endpoint)
            .header("X-API-Key", &api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "PDF render request failed");
                PdfRenderError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, "PDF render service returned error");
            return Err(PdfRenderError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PdfRenderError::RequestFailed(e.to_string()))?;

        if bytes.is_empty() {
            return Err(PdfRenderError::EmptyDocument);
        }

        info!(url = %url, size = bytes.len(), "PDF rendered successfully");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[test]
    fn test_default_options_match_export_contract() {
        let opts = PdfRenderOptions::default();
        assert!(opts.landscape);
        assert!(opts.full_page);
        assert!(opts.print_background);
        assert_eq!(opts.delay_ms, RENDER_SETTLE_DELAY_MS);
        assert!(opts.css.contains("page-break-after: always"));
        assert!(opts.css.contains("section:last-of-type"));
    }

    #[tokio::test]
    async fn test_unconfigured_key_routes_to_fallback() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::common::migrations::run_migrations(&pool).await.unwrap();
        let service = PdfRenderService::new(
            Arc::new(SettingsService::new(pool)),
            Client::new(),
        );

        assert!(!service.is_configured().await);
        match service
            .render_url("http://localhost/summary?id=P_1", &PdfRenderOptions::default())
            .await
        {
            Err(PdfRenderError::NotConfigured) => {}
            other => panic!("expected NotConfigured, got {:?}", other.map(|b| b.len())),
        }
    }
}

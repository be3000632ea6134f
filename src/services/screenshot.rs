// src/services/screenshot.rs
//
// Client for the hosted screenshot service used by section capture. Same
// optional-key pattern as PDF rendering: without a key the caller hands the
// summary URL back for manual capture.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::services::settings::{SettingsError, SettingsService};

/// Fixed delay before capture so client-side rendering settles.
pub const CAPTURE_SETTLE_DELAY_MS: u64 = 3_000;

/// Capture scale factor; sections are rasterized at 2x for print quality.
pub const CAPTURE_SCALE: u32 = 2;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("Screenshot API key not configured")]
    NotConfigured,

    #[error("Screenshot request failed: {0}")]
    RequestFailed(String),

    #[error("Screenshot service returned HTTP {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Screenshot service returned no image data")]
    EmptyImage,

    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
}

#[derive(Debug, Serialize)]
struct CaptureRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    selector: Option<&'a str>,
    delay: u64,
    scale: u32,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug)]
pub struct ScreenshotService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl ScreenshotService {
    pub fn new(settings_service: Arc<SettingsService>, client: Client) -> Self {
        Self {
            settings_service,
            client,
        }
    }

    /// Whether the external screenshot service is usable at all
    pub async fn is_configured(&self) -> bool {
        matches!(
            self.settings_service.get_setting("screenshot_api_key").await,
            Ok(Some(ref key)) if !key.is_empty()
        )
    }

    /// Capture one page region as PNG bytes via the external service.
    ///
    /// `selector` narrows the capture to a single section; `None` captures the
    /// full viewport.
    pub async fn capture_url(
        &self,
        url: &str,
        selector: Option<&str>,
    ) -> Result<Vec<u8>, ScreenshotError> {
        let api_key = self
            .settings_service
            .get_setting("screenshot_api_key")
            .await?
            .filter(|key| !key.is_empty())
            .ok_or(ScreenshotError::NotConfigured)?;

        let endpoint = self
            .settings_service
            .get_setting("screenshot_endpoint")
            .await?
            .unwrap_or_else(|| "https://api.screenshotone.com/take".to_string());

        let request = CaptureRequest {
            url,
            selector,
            delay: CAPTURE_SETTLE_DELAY_MS,
            scale: CAPTURE_SCALE,
            format: "png",
        };

        debug!(url = %url, selector = ?selector, "Requesting screenshot capture");

        let response = self
            .client
            .post(&endpoint)
            .header("X-API-Key", &api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Screenshot request failed");
                ScreenshotError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, "Screenshot service returned error");
            return Err(ScreenshotError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        // Binary PNG or JSON with a base64 image, depending on the provider
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = if content_type.contains("application/json") {
            let body: CaptureResponse = response
                .json()
                .await
                .map_err(|e| ScreenshotError::RequestFailed(e.to_string()))?;
            let encoded = body.image.ok_or(ScreenshotError::EmptyImage)?;
            BASE64
                .decode(encoded.as_bytes())
                .map_err(|e| ScreenshotError::RequestFailed(e.to_string()))?
        } else {
            response
                .bytes()
                .await
                .map_err(|e| ScreenshotError::RequestFailed(e.to_string()))?
                .to_vec()
        };

        if bytes.is_empty() {
            return Err(ScreenshotError::EmptyImage);
        }

        info!(url = %url, size = bytes.len(), "Screenshot captured");
        Ok(bytes)
    }
}

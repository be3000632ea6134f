// src/exports/capture.rs
//
// Section capture for the images export: each slide of the summary page is
// rasterized independently, and one failed section never sinks the rest.

use async_trait::async_trait;
use tracing::warn;

use crate::services::{ScreenshotError, ScreenshotService};

/// Anything that can rasterize one region of a page. The screenshot service
/// is the production implementation; tests substitute their own.
#[async_trait]
pub trait SectionRenderer: Send + Sync {
    async fn capture(&self, url: &str, selector: &str) -> Result<Vec<u8>, ScreenshotError>;
}

#[async_trait]
impl SectionRenderer for ScreenshotService {
    async fn capture(&self, url: &str, selector: &str) -> Result<Vec<u8>, ScreenshotError> {
        self.capture_url(url, Some(selector)).await
    }
}

#[derive(Debug)]
pub struct CapturedSection {
    pub name: String,
    /// Raw PNG bytes, or `None` when this section's capture failed
    pub image: Option<Vec<u8>>,
}

/// Capture each named section of `url` in order. Per-section failures are
/// logged and reported as `None` so the caller can filter them without
/// aborting the batch.
pub async fn capture_sections<R: SectionRenderer + ?Sized>(
    renderer: &R,
    url: &str,
    sections: &[(String, String)],
) -> Vec<CapturedSection> {
    let mut captured = Vec::with_capacity(sections.len());

    for (name, selector) in sections {
        match renderer.capture(url, selector).await {
            Ok(bytes) => captured.push(CapturedSection {
                name: name.clone(),
                image: Some(bytes),
            }),
            Err(e) => {
                warn!(
                    error = %e,
                    section = %name,
                    url = %url,
                    "Section capture failed, continuing with remaining sections"
                );
                captured.push(CapturedSection {
                    name: name.clone(),
                    image: None,
                });
            }
        }
    }

    captured
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyRenderer;

    #[async_trait]
    impl SectionRenderer for FlakyRenderer {
        async fn capture(&self, _url: &str, selector: &str) -> Result<Vec<u8>, ScreenshotError> {
            if selector.contains("experience") {
                Err(ScreenshotError::EmptyImage)
            } else {
                Ok(vec![0x89, 0x50, 0x4E, 0x47])
            }
        }
    }

    #[tokio::test]
    async fn test_one_failed_section_does_not_sink_the_rest() {
        let sections = vec![
            ("cover".to_string(), "#slide-cover".to_string()),
            ("experience".to_string(), "#slide-experience".to_string()),
            ("contact".to_string(), "#slide-contact".to_string()),
        ];

        let captured = capture_sections(&FlakyRenderer, "http://localhost/summary", &sections).await;

        assert_eq!(captured.len(), 3);
        assert!(captured[0].image.is_some());
        assert!(captured[1].image.is_none());
        assert!(captured[2].image.is_some());
        assert_eq!(captured[1].name, "experience");
    }

    #[tokio::test]
    async fn test_sections_keep_request_order() {
        let sections = vec![
            ("cover".to_string(), "#slide-cover".to_string()),
            ("contact".to_string(), "#slide-contact".to_string()),
        ];
        let captured = capture_sections(&FlakyRenderer, "http://localhost/summary", &sections).await;
        let names: Vec<&str> = captured.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["cover", "contact"]);
    }
}

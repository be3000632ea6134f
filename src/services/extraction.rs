// src/services/extraction.rs
//
// Schema-guided structured extraction over the OpenAI API. The caller hands in
// resume content plus a JSON field descriptor; the outcome carries a status
// flag and only "success" outcomes contain usable output.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::services::settings::SettingsService;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// What the extractor is pointed at
#[derive(Debug, Clone)]
pub enum ExtractionSource {
    /// Plain text already pulled out of the document
    Text(String),
    /// Durable URL of the uploaded document, for formats we do not parse locally
    Url(String),
}

/// Result of one extraction call. Mirrors the upstream contract: a status flag
/// plus output that is only meaningful when `status == "success"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl ExtractionOutcome {
    pub fn success(output: Value) -> Self {
        Self {
            status: "success".to_string(),
            details: None,
            output: Some(output),
        }
    }

    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details.into()),
            output: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

const MAX_RETRIES: u32 = 3;

#[derive(Debug)]
pub struct ExtractionService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl ExtractionService {
    pub fn new(settings_service: Arc<SettingsService>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            settings_service,
            client,
        }
    }

    /// Get extraction configuration from settings
    pub async fn get_config(&self) -> Result<ExtractionConfig, ExtractionError> {
        let api_key = self
            .settings_service
            .get_setting("openai_api_key")
            .await
            .map_err(|e| ExtractionError::SettingsError(e.to_string()))?
            .ok_or(ExtractionError::NotConfigured)?;

        let base_url = self
            .settings_service
            .get_setting("openai_base_url")
            .await
            .map_err(|e| ExtractionError::SettingsError(e.to_string()))?
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        let model = self
            .settings_service
            .get_setting("openai_model")
            .await
            .map_err(|e| ExtractionError::SettingsError(e.to_string()))?
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        Ok(ExtractionConfig {
            api_key,
            base_url,
            model,
        })
    }

    /// Extract structured fields from a resume, guided by a JSON schema.
    ///
    /// Network and configuration problems surface as `Err`; a completed call
    /// whose content cannot be interpreted comes back as a non-success outcome
    /// so the caller can distinguish "retry later" from "this document did not
    /// extract".
    pub async fn extract_structured(
        &self,
        source: ExtractionSource,
        schema: &Value,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let config = self.get_config().await?;

        let schema_str = serde_json::to_string_pretty(schema)
            .map_err(|e| ExtractionError::SerializationError(e.to_string()))?;

        let source_block = match &source {
            ExtractionSource::Text(text) => format!("Resume text:\n{}", text),
            ExtractionSource::Url(url) => format!("Resume document URL: {}", url),
        };

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: concat!(
                    "You extract structured career data from resumes. ",
                    "Respond with a single JSON object that conforms to the provided ",
                    "field schema. Omit fields you cannot find; never invent values."
                )
                .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!("Field schema:\n{}\n\n{}", schema_str, source_block),
            },
        ];

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages,
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        debug!(model = %config.model, "Sending extraction request");

        let response = self.make_request_with_retry(&config, request).await?;

        let content = response
            .choices
            .first()
            .ok_or_else(|| ExtractionError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .clone();

        if let Some(usage) = response.usage {
            info!(
                model = %config.model,
                tokens_used = usage.total_tokens,
                "Extraction completed"
            );
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(ExtractionOutcome::success(Value::Object(map))),
            Ok(_) => {
                warn!("Extraction returned non-object JSON");
                Ok(ExtractionOutcome::failed("Extractor returned non-object JSON"))
            }
            Err(e) => {
                warn!(error = %e, "Extraction returned unparseable content");
                Ok(ExtractionOutcome::failed(format!(
                    "Extractor output was not valid JSON: {}",
                    e
                )))
            }
        }
    }

    /// Make API request with retry on rate limiting and transient upstream errors
    async fn make_request_with_retry(
        &self,
        config: &ExtractionConfig,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ExtractionError> {
        let url = format!("{}/v1/chat/completions", config.base_url);

        let mut attempt = 0;
        loop {
            attempt += 1;

            let response = self
                .client
                .post(&url)
                .bearer_auth(&config.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

            let status = response.status();

            if status.is_success() {
                return response
                    .json::<ChatCompletionResponse>()
                    .await
                    .map_err(|e| ExtractionError::InvalidResponse(e.to_string()));
            }

            let retryable = status.as_u16() == 429 || status.is_server_error();
            if !retryable || attempt >= MAX_RETRIES {
                let body = response.text().await.unwrap_or_default();
                error!(status = %status, attempt = attempt, "Extraction request failed");
                if status.as_u16() == 429 {
                    return Err(ExtractionError::RateLimitExceeded);
                }
                return Err(ExtractionError::RequestFailed(format!(
                    "HTTP {}: {}",
                    status, body
                )));
            }

            let backoff = std::time::Duration::from_millis(500 * 2u64.pow(attempt));
            warn!(status = %status, attempt = attempt, "Retrying extraction request");
            tokio::time::sleep(backoff).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success_flag() {
        let ok = ExtractionOutcome::success(serde_json::json!({"full_name": "Jane Doe"}));
        assert!(ok.is_success());
        assert!(ok.output.is_some());

        let failed = ExtractionOutcome::failed("garbled");
        assert!(!failed.is_success());
        assert!(failed.output.is_none());
        assert_eq!(failed.status, "error");
    }

    #[test]
    fn test_outcome_serialization_omits_empty_fields() {
        let failed = ExtractionOutcome::failed("bad scan");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["details"], "bad scan");
        assert!(json.get("output").is_none());
    }
}

// src/services/storage.rs
//
// Object storage for uploaded assets (resumes, photos, captured images).
// Uses S3 when configured, local disk otherwise. An S3 failure falls back
// to local disk so an upload only fails when both sinks fail.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::services::settings::{SettingsError, SettingsService};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage credentials not configured")]
    NotConfigured,

    #[error("S3 operation failed: {0}")]
    S3Error(String),

    #[error("Local write failed: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket_name: String,
    pub cloudfront_domain: Option<String>,
}

#[derive(Debug)]
pub struct StorageService {
    settings_service: Arc<SettingsService>,
    uploads_dir: PathBuf,
    public_base_url: String,
}

impl StorageService {
    pub fn new(
        settings_service: Arc<SettingsService>,
        uploads_dir: PathBuf,
        public_base_url: String,
    ) -> Self {
        Self {
            settings_service,
            uploads_dir,
            public_base_url,
        }
    }

    /// Get S3 configuration from settings
    pub async fn get_config(&self) -> Result<StorageConfig, StorageError> {
        let keys = [
            "aws_access_key_id",
            "aws_secret_access_key",
            "aws_region",
            "aws_s3_bucket_name",
            "aws_cloudfront_domain",
        ];

        let settings = self.settings_service.get_settings(&keys).await?;

        let access_key_id = settings
            .get("aws_access_key_id")
            .and_then(|v| v.clone())
            .ok_or(StorageError::NotConfigured)?;

        let secret_access_key = settings
            .get("aws_secret_access_key")
            .and_then(|v| v.clone())
            .ok_or(StorageError::NotConfigured)?;

        let region = settings
            .get("aws_region")
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "us-east-1".to_string());

        let bucket_name = settings
            .get("aws_s3_bucket_name")
            .and_then(|v| v.clone())
            .unwrap_or_default();

        let cloudfront_domain = settings.get("aws_cloudfront_domain").and_then(|v| v.clone());

        Ok(StorageConfig {
            access_key_id,
            secret_access_key,
            region,
            bucket_name,
            cloudfront_domain,
        })
    }

    /// Initialize S3 client with credentials from settings
    async fn get_s3_client(&self) -> Result<(S3Client, StorageConfig), StorageError> {
        let config = self.get_config().await?;

        if config.bucket_name.is_empty() {
            return Err(StorageError::InvalidConfig(
                "S3 bucket name not configured".to_string(),
            ));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "settings",
        );

        let region = Region::new(config.region.clone());

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .load()
            .await;

        let client = S3Client::new(&aws_config);

        Ok((client, config))
    }

    /// Upload a file and return its durable public URL
    pub async fn upload(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let storage_type = self
            .settings_service
            .get_setting("storage_type")
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| "local".to_string());

        if storage_type.starts_with("s3") {
            match self.upload_s3(data.clone(), key, content_type).await {
                Ok(url) => return Ok(url),
                Err(e) => {
                    warn!(error = %e, key = %key, "S3 upload failed, falling back to local storage");
                }
            }
        }

        self.upload_local(data, key).await
    }

    async fn upload_s3(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let (client, config) = self.get_s3_client().await?;

        let body = ByteStream::from(Bytes::from(data));

        client
            .put_object()
            .bucket(&config.bucket_name)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to upload file to S3");
                StorageError::S3Error(format!("Upload failed: {}", e))
            })?;

        let url = match &config.cloudfront_domain {
            Some(domain) => format!("https://{}/{}", domain, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                config.bucket_name, config.region, key
            ),
        };

        info!(key = %key, bucket = %config.bucket_name, "File uploaded to S3 successfully");
        Ok(url)
    }

    async fn upload_local(&self, data: Vec<u8>, key: &str) -> Result<String, StorageError> {
        let path = self.uploads_dir.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await.map_err(|e| {
            error!(error = %e, key = %key, "Failed to save file locally");
            e
        })?;

        info!(key = %key, "File saved to local storage");
        Ok(format!("{}/uploads/{}", self.public_base_url, key))
    }
}

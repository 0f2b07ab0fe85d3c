// ==================== IMAGE HOST ====================
// Profile images live on Cloudinary. Uploads return a public URL plus the
// public_id used later to destroy the asset.

use crate::{config::CloudinaryConfig, utils::error::AppError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;

/// Profiles are stored no larger than this box (crop mode "limit").
pub const MAX_DIMENSION: u32 = 500;

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<HostedImage, AppError>;
    async fn delete(&self, public_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorMessage,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

pub struct CloudinaryImageHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
    base_url: String,
}

impl CloudinaryImageHost {
    pub fn new(config: CloudinaryConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!("https://api.cloudinary.com/v1_1/{}/image", config.cloud_name),
            config,
        })
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    async fn error_from(response: reqwest::Response) -> AppError {
        let status = response.status();
        let message = match response.json::<CloudinaryErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error body".to_string(),
        };
        AppError::Upstream(format!("Cloudinary returned {}: {}", status, message))
    }
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<HostedImage, AppError> {
        let timestamp = Self::timestamp();
        let transformation = format!("c_limit,h_{0},w_{0}", MAX_DIMENSION);
        let signature = sign(
            &[
                ("folder", folder),
                ("timestamp", &timestamp),
                ("transformation", &transformation),
            ],
            &self.config.api_secret,
        );

        let file = Part::bytes(image.bytes)
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| AppError::Upstream(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("transformation", transformation)
            .text("signature", signature);

        log::info!("☁️  Uploading {} to folder {}", image.file_name, folder);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: UploadResponse = response.json().await?;
        log::info!("✅ Image uploaded: {}", body.public_id);

        Ok(HostedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        let timestamp = Self::timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id.to_string()),
            ("api_key", self.config.api_key.clone()),
            ("timestamp", timestamp),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(format!("{}/destroy", self.base_url))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" | "not found" => {
                log::info!("🗑️  Image {} destroyed ({})", public_id, body.result);
                Ok(())
            }
            other => Err(AppError::Upstream(format!(
                "Unexpected destroy result for {}: {}",
                public_id, other
            ))),
        }
    }
}

/// Cloudinary request signature: SHA-1 over the sorted `key=value` pairs
/// joined with `&`, immediately followed by the API secret.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let payload = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

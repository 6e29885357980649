//! Image-hosting upload
//!
//! One multipart POST per upload, no retries. A response that is not the
//! documented success shape is a hard failure that propagates to the
//! caller.

use crate::config::Service;
use crate::error::{DetectError, Result};
use crate::result::ImageFile;
use parking_lot::RwLock;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Hosted copy of an uploaded image.
#[derive(Debug, Clone, Deserialize)]
pub struct HostedImage {
    pub url: String,
    pub display_url: String,
    pub delete_url: String,
}

#[derive(Debug, Deserialize)]
struct HostingResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<HostedImage>,
    #[serde(default)]
    status: i64,
}

pub struct HostingClient {
    api_key: Arc<RwLock<Option<String>>>,
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HostingClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        Self {
            api_key: Arc::new(RwLock::new(None)),
            client: Client::new(),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.read().is_some()
    }

    pub fn set_api_key(&self, key: String) {
        *self.api_key.write() = Some(key);
    }

    fn get_api_key(&self) -> Result<String> {
        self.api_key
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| DetectError::MissingApiKey(Service::Hosting.as_str().to_string()))
    }

    /// Upload an image and return its hosted URLs.
    pub async fn upload(&self, file: &ImageFile) -> Result<HostedImage> {
        let api_key = self.get_api_key()?;

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| DetectError::UploadFailed(format!("Invalid MIME type: {}", e)))?;

        let form = Form::new().text("key", api_key).part("image", part);

        tracing::debug!(name = %file.name, bytes = file.len(), "Uploading image to hosting");

        let response = self
            .client
            .post(&self.base_url)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();

        if status == 429 {
            return Err(DetectError::RateLimit);
        }

        if status == 401 || status == 403 {
            return Err(DetectError::AuthenticationFailed);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DetectError::UploadFailed(format!(
                "HTTP {}: {}",
                status,
                crate::error::truncate_body(&text, 500)
            )));
        }

        let body: HostingResponse = response.json().await?;

        if !body.success {
            return Err(DetectError::UploadFailed(format!(
                "Hosting service reported failure (status {})",
                body.status
            )));
        }

        body.data.ok_or_else(|| {
            DetectError::UploadFailed("Success response without image data".to_string())
        })
    }
}

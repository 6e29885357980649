use crate::config::{DetectConfig, Service};
use crate::error::{DetectError, Result};
use crate::hosting::HostingClient;
use crate::result::{Detection, ImageFile};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::json;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// System instruction constraining the model to the two-shape JSON
/// contract. Any text outside the JSON object makes the answer unparseable.
const SYSTEM_INSTRUCTION: &str = "You are a bird nest detection system. Only respond in valid JSON format. \
    If you detect a bird nest in the image, respond with {\"found\": true, \"position\": {\"x1\": int, \"y1\": int, \"x2\": int, \"y2\": int}} \
    where the position represents the approximate bounding box coordinates of the nest in pixels (top-left x,y to bottom-right x,y). \
    If no bird nest is detected, respond with {\"found\": false, \"description\": \"detailed description of what is actually in the image\"}. \
    Do not include any explanations or additional text outside of the JSON response.";

const USER_PROMPT: &str = "Is there a bird nest in this image? If yes, provide its pixel coordinates. \
    If no, describe what is in the image.";

/// Seam between the view layer and the network.
///
/// Implementations never surface errors: every transport, parse, or schema
/// failure is absorbed and mapped to [`Detection::degraded`], so callers
/// always receive a completed result.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detect against an already-fetchable image URL.
    async fn detect_url(&self, url: &str) -> Detection;

    /// Detect against an uploaded file.
    async fn detect_file(&self, file: &ImageFile) -> Detection;
}

pub struct NestDetector {
    api_key: Arc<RwLock<Option<String>>>,
    client: Client,
    config: DetectConfig,
    hosting: HostingClient,
}

impl NestDetector {
    /// Create a detector, picking up credentials from the environment.
    pub fn new() -> Self {
        Self::with_config(DetectConfig::default())
    }

    pub fn with_config(config: DetectConfig) -> Self {
        let hosting = HostingClient::new(config.hosting_url.clone(), config.request_timeout_secs);
        let detector = Self {
            api_key: Arc::new(RwLock::new(None)),
            client: Client::new(),
            config,
            hosting,
        };
        detector.initialize_from_env();
        detector
    }

    fn initialize_from_env(&self) {
        for service in [Service::Detection, Service::Hosting] {
            if let Ok(key) = env::var(service.env_var_name()) {
                self.set_api_key(service, key);
            }
        }
    }

    /// Set API key for a service
    pub fn set_api_key(&self, service: Service, key: String) {
        if key.is_empty() {
            tracing::warn!("Empty API key provided for {:?}", service);
            return;
        }

        if key.len() > 1000 {
            tracing::warn!("API key too long for {:?}", service);
            return;
        }

        match service {
            Service::Detection => *self.api_key.write() = Some(key),
            Service::Hosting => self.hosting.set_api_key(key),
        }
    }

    pub fn has_api_key(&self, service: Service) -> bool {
        match service {
            Service::Detection => self.api_key.read().is_some(),
            Service::Hosting => self.hosting.has_api_key(),
        }
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    fn get_api_key(&self) -> Result<String> {
        self.api_key
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| DetectError::MissingApiKey(Service::Detection.as_str().to_string()))
    }

    /// One completion round trip against an image reference (hosted URL or
    /// data URI). Fallible; the degrade policy lives in the trait impl.
    pub async fn request_detection(&self, image_url: &str) -> Result<Detection> {
        let api_key = self.get_api_key()?;

        let body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_INSTRUCTION
                },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": USER_PROMPT
                        },
                        {
                            "type": "image_url",
                            "image_url": {"url": image_url}
                        }
                    ]
                }
            ]
        });

        // Never log the full key
        let api_key_prefix = if api_key.len() > 8 { &api_key[..8] } else { "***" };
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, "Requesting detection with key {}...", api_key_prefix);

        let response = self
            .client
            .post(&self.config.detection_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .json(&body)
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
            return Err(DetectError::InvalidResponse(format!(
                "HTTP {}: {}",
                status,
                crate::error::truncate_body(&text, 500)
            )));
        }

        let json: serde_json::Value = response.json().await?;

        let choices = json.get("choices").and_then(|c| c.as_array()).ok_or_else(|| {
            DetectError::InvalidResponse("Invalid response format: no choices array".to_string())
        })?;

        if choices.is_empty() {
            return Err(DetectError::InvalidResponse("No choices in response".to_string()));
        }

        let content = choices[0]["message"]["content"].as_str().ok_or_else(|| {
            DetectError::InvalidResponse("Choice without message content".to_string())
        })?;

        let detection = Detection::parse(content)?;
        tracing::debug!(%request_id, found = detection.is_found(), "Detection completed");
        Ok(detection)
    }

    /// Turn a file into an image reference the completion endpoint can
    /// fetch: a hosted URL when the hosting key is configured, otherwise an
    /// inline data URI.
    async fn resolve_image_reference(&self, file: &ImageFile) -> Result<String> {
        if self.hosting.has_api_key() {
            let hosted = self.hosting.upload(file).await?;
            tracing::debug!(url = %hosted.url, "Image uploaded for detection");
            Ok(hosted.url)
        } else {
            Ok(format!(
                "data:{};base64,{}",
                file.media_type,
                general_purpose::STANDARD.encode(&file.data)
            ))
        }
    }

    async fn try_detect_file(&self, file: &ImageFile) -> Result<Detection> {
        let image_url = self.resolve_image_reference(file).await?;
        self.request_detection(&image_url).await
    }
}

impl Default for NestDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for NestDetector {
    async fn detect_url(&self, url: &str) -> Detection {
        match self.request_detection(url).await {
            Ok(detection) => detection,
            Err(e) => {
                tracing::error!("Detection from URL failed: {}", e);
                Detection::degraded()
            }
        }
    }

    async fn detect_file(&self, file: &ImageFile) -> Detection {
        match self.try_detect_file(file).await {
            Ok(detection) => detection,
            Err(e) => {
                tracing::error!("Detection from file failed: {}", e);
                Detection::degraded()
            }
        }
    }
}

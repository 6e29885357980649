use serde::{Deserialize, Serialize};

/// External services the client authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    /// The multimodal chat-completion endpoint.
    Detection,
    /// The image-hosting upload endpoint.
    Hosting,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Detection => "detection",
            Service::Hosting => "hosting",
        }
    }

    pub fn env_var_name(&self) -> &'static str {
        match self {
            Service::Detection => "OPENROUTER_API_KEY",
            Service::Hosting => "IMGBB_API_KEY",
        }
    }
}

/// Detection client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Chat-completion endpoint URL.
    pub detection_url: String,
    /// Image-hosting upload endpoint URL.
    pub hosting_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            model: "google/gemma-3-27b-it:free".to_string(),
            detection_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            hosting_url: "https://api.imgbb.com/1/upload".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl DetectConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.is_empty() {
            return Err("Model identifier must be non-empty".to_string());
        }

        // Only https endpoints are accepted, matching the provider layer
        if !self.detection_url.starts_with("https://") {
            return Err("Detection URL must use https".to_string());
        }

        if !self.hosting_url.starts_with("https://") {
            return Err("Hosting URL must use https".to_string());
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > 600 {
            return Err("Request timeout must be between 1 and 600 seconds".to_string());
        }

        Ok(())
    }
}

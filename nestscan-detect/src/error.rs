use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("API key not set for service: {0}")]
    MissingApiKey(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),

    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    AuthenticationFailed,
}

pub type Result<T> = std::result::Result<T, DetectError>;

/// Trim an error body for inclusion in an error message. Truncation lands
/// on a char boundary; byte 500 of a response can sit inside a multi-byte
/// character.
pub(crate) fn truncate_body(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

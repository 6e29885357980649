//! Preview resource lifecycle
//!
//! The preview of an uploaded file is a locally created, revocable
//! reference (an object URL in a browser shell, a temp file elsewhere).
//! Whatever it is, it must be released exactly once: on reset, or when a
//! new submission replaces it.

use nestscan_detect::ImageFile;

type Revoker = Box<dyn FnOnce(&str) + Send + Sync>;

/// Owned handle to one revocable preview resource.
///
/// `release` runs the revoker at most once; dropping an unreleased handle
/// releases it as a backstop.
pub struct PreviewHandle {
    uri: String,
    revoke: Option<Revoker>,
}

impl PreviewHandle {
    pub fn new(uri: impl Into<String>, revoke: impl FnOnce(&str) + Send + Sync + 'static) -> Self {
        Self {
            uri: uri.into(),
            revoke: Some(Box::new(revoke)),
        }
    }

    /// A handle with nothing to revoke, for previews that are plain URLs.
    pub fn unmanaged(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            revoke: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_released(&self) -> bool {
        self.revoke.is_none()
    }

    /// Release the underlying resource. Idempotent.
    pub fn release(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            tracing::debug!(uri = %self.uri, "Releasing preview resource");
            revoke(&self.uri);
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("uri", &self.uri)
            .field("released", &self.is_released())
            .finish()
    }
}

/// An accepted upload: the preview the UI shows while the file itself goes
/// to the detection client.
#[derive(Debug)]
pub struct UploadedImage {
    pub preview: PreviewHandle,
    pub file: ImageFile,
}

//! Result presentation session
//!
//! Explicit state machine replacing effect-driven view state: Idle (no
//! image, no result) -> Busy (one request outstanding) -> Settled (result
//! present, possibly degraded). Failures never surface here as errors; the
//! detector seam absorbs them, so a submission always settles with some
//! result. Overlay geometry is re-derived from declared inputs (result,
//! natural size, container size) on every publish.

use crate::error::{Result, ViewError};
use crate::geometry::{overlay_rect, ContainerSize, ImageDimensions, ViewportRect};
use crate::intake;
use crate::preview::{PreviewHandle, UploadedImage};
use nestscan_detect::{Detection, Detector};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy,
    Settled,
}

/// Client-visible state, published on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub result: Option<Detection>,
    pub natural_size: Option<ImageDimensions>,
    pub overlay: Option<ViewportRect>,
    /// The displayed image failed to load; inline failure state only, the
    /// stored result is untouched.
    pub image_failed: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            result: None,
            natural_size: None,
            overlay: None,
            image_failed: false,
        }
    }
}

struct Inner {
    phase: Phase,
    result: Option<Detection>,
    natural: Option<ImageDimensions>,
    container: Option<ContainerSize>,
    preview: Option<PreviewHandle>,
    image_failed: bool,
    /// Bumped on every submission and reset; a completion whose generation
    /// no longer matches has been superseded and is discarded.
    generation: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            result: None,
            natural: None,
            container: None,
            preview: None,
            image_failed: false,
            generation: 0,
        }
    }

    fn release_preview(&mut self) {
        if let Some(mut preview) = self.preview.take() {
            preview.release();
        }
    }

    fn derive_overlay(&self) -> Option<ViewportRect> {
        let position = self.result.as_ref()?.position()?;
        overlay_rect(position, self.natural?, self.container?)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            result: self.result.clone(),
            natural_size: self.natural,
            overlay: self.derive_overlay(),
            image_failed: self.image_failed,
        }
    }
}

/// Owns the view state machine and the preview resource; drives the
/// detector and keeps the overlay aligned with the displayed image.
pub struct DetectionSession {
    detector: Arc<dyn Detector>,
    inner: Arc<RwLock<Inner>>,
    publisher: watch::Sender<Snapshot>,
}

impl DetectionSession {
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        let (publisher, _) = watch::channel(Snapshot::default());
        Self {
            detector,
            inner: Arc::new(RwLock::new(Inner::new())),
            publisher,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.inner.read().phase
    }

    /// Submit an accepted upload for detection.
    ///
    /// Rejected before any state transition when intake validation fails,
    /// or with [`ViewError::Busy`] while another request is outstanding.
    /// Always resolves to a (possibly degraded) result otherwise.
    pub async fn submit_file(&self, image: UploadedImage) -> Result<Detection> {
        intake::validate_file(&image.file)?;

        let natural = intake::probe_dimensions(&image.file);
        let generation = self.begin(Some(image.preview), natural)?;

        let detection = self.detector.detect_file(&image.file).await;
        self.finish(generation, detection.clone());
        Ok(detection)
    }

    /// Submit an image URL for detection.
    pub async fn submit_url(&self, input: &str) -> Result<Detection> {
        let url = intake::validate_url(input)?;

        // Natural size arrives later via image_loaded, once the UI has
        // actually fetched the picture.
        let generation = self.begin(None, None)?;

        let detection = self.detector.detect_url(url.as_str()).await;
        self.finish(generation, detection.clone());
        Ok(detection)
    }

    /// Return to Idle, releasing the preview resource exactly once.
    ///
    /// Valid from any phase; calling it while Busy supersedes the in-flight
    /// request, whose late result is then discarded. Idempotent.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        if inner.phase == Phase::Busy {
            tracing::debug!("Reset while busy; in-flight request superseded");
        }
        inner.generation += 1;
        inner.release_preview();
        inner.phase = Phase::Idle;
        inner.result = None;
        inner.natural = None;
        inner.image_failed = false;
        self.publish(&inner);
    }

    /// The rendering area changed; re-derive the overlay.
    pub fn set_container_size(&self, container: ContainerSize) {
        let mut inner = self.inner.write();
        inner.container = Some(container);
        self.publish(&inner);
    }

    /// The displayed image finished loading at its natural size.
    pub fn image_loaded(&self, natural: ImageDimensions) {
        let mut inner = self.inner.write();
        inner.natural = Some(natural);
        inner.image_failed = false;
        self.publish(&inner);
    }

    /// The displayed image failed to load.
    pub fn image_failed(&self) {
        let mut inner = self.inner.write();
        inner.image_failed = true;
        self.publish(&inner);
    }

    /// Atomically enter Busy, replacing any previous submission's state.
    fn begin(
        &self,
        preview: Option<PreviewHandle>,
        natural: Option<ImageDimensions>,
    ) -> Result<u64> {
        let mut inner = self.inner.write();
        if inner.phase == Phase::Busy {
            return Err(ViewError::Busy);
        }

        inner.release_preview();
        inner.preview = preview;
        inner.result = None;
        inner.natural = natural;
        inner.image_failed = false;
        inner.generation += 1;
        inner.phase = Phase::Busy;
        self.publish(&inner);
        Ok(inner.generation)
    }

    /// Settle a completed request unless it has been superseded.
    fn finish(&self, generation: u64, detection: Detection) {
        let mut inner = self.inner.write();
        if inner.generation != generation {
            tracing::debug!(generation, "Discarding stale detection result");
            return;
        }

        inner.result = Some(detection);
        inner.phase = Phase::Settled;
        self.publish(&inner);
    }

    fn publish(&self, inner: &Inner) {
        self.publisher.send_replace(inner.snapshot());
    }
}

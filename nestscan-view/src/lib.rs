//! nestscan-view: view-side core for NestScan
//!
//! Owns everything between the UI shell and the detection client: upload
//! intake validation, the preview resource lifecycle, the Idle/Busy/Settled
//! session state machine, and the pure letterbox geometry that maps a
//! detected bounding box onto the displayed image.

pub mod error;
pub mod geometry;
pub mod intake;
pub mod preview;
pub mod session;


pub use error::{Result, ViewError};
pub use geometry::{overlay_rect, ContainerSize, ImageDimensions, ViewportRect};
pub use intake::{probe_dimensions, validate_file, validate_url, MAX_UPLOAD_BYTES};
pub use preview::{PreviewHandle, UploadedImage};
pub use session::{DetectionSession, Phase, Snapshot};

//! Letterbox geometry
//!
//! The UI renders the image with "contain" fit: scaled to sit entirely
//! inside its container, aspect ratio preserved, centered with empty
//! margins on one axis. A bounding box in the original image's pixel space
//! has to go through the same transform to land on the displayed pixels.

use nestscan_detect::BoundingBox;
use serde::{Deserialize, Serialize};

/// Natural (undecoded-scale) size of the original image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// On-screen rendering area the image is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

/// Derived on-screen placement of the overlay. Recomputed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Map a detection box from original-image pixels to container pixels.
///
/// Returns `None` when there is nothing to scale against (a zero natural
/// dimension) or when the box is malformed (inverted corners); such a box
/// is skipped, not an error.
pub fn overlay_rect(
    bounding_box: &BoundingBox,
    natural: ImageDimensions,
    container: ContainerSize,
) -> Option<ViewportRect> {
    if natural.width == 0 || natural.height == 0 {
        return None;
    }

    if !bounding_box.is_well_formed() {
        return None;
    }

    let scale_x = container.width / natural.width as f64;
    let scale_y = container.height / natural.height as f64;

    // The smaller scale keeps the full image visible without cropping
    let scale = scale_x.min(scale_y);

    let scaled_width = natural.width as f64 * scale;
    let scaled_height = natural.height as f64 * scale;

    // Offsets center the letterboxed image in the container
    let offset_x = (container.width - scaled_width) / 2.0;
    let offset_y = (container.height - scaled_height) / 2.0;

    Some(ViewportRect {
        left: bounding_box.x1 as f64 * scale + offset_x,
        top: bounding_box.y1 as f64 * scale + offset_y,
        width: (bounding_box.x2 - bounding_box.x1) as f64 * scale,
        height: (bounding_box.y2 - bounding_box.y1) as f64 * scale,
    })
}

//! Detection result schema
//!
//! The model is instructed to answer with exactly one of two JSON shapes:
//! `{"found": true, "position": {...}}` or
//! `{"found": false, "description": "..."}`. Parsing is strict: unknown
//! fields, a missing `position` on a found result, or a missing
//! `description` on a not-found result are all schema errors.

use crate::error::{DetectError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in the original image's pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundingBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl BoundingBox {
    /// Whether the corners are ordered top-left to bottom-right.
    pub fn is_well_formed(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }
}

/// Outcome of one detection round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Found { position: BoundingBox },
    NotFound { description: String },
}

impl Detection {
    /// Synthesized result used when the real detection call fails.
    pub fn degraded() -> Self {
        Detection::NotFound {
            description: "Unable to analyze the image. Please try again.".to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Detection::Found { .. })
    }

    /// Bounding box, present only for found results.
    pub fn position(&self) -> Option<&BoundingBox> {
        match self {
            Detection::Found { position } => Some(position),
            Detection::NotFound { .. } => None,
        }
    }

    /// Parse the raw completion text as a strict detection result.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawDetection = serde_json::from_str(content)?;
        raw.try_into()
    }
}

/// Wire form of [`Detection`]; `found` selects which optional field must
/// be present.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDetection {
    found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl TryFrom<RawDetection> for Detection {
    type Error = DetectError;

    fn try_from(raw: RawDetection) -> Result<Self> {
        match (raw.found, raw.position, raw.description) {
            (true, Some(position), None) => Ok(Detection::Found { position }),
            (false, None, Some(description)) => Ok(Detection::NotFound { description }),
            (true, None, _) => Err(DetectError::InvalidResponse(
                "Found result without a position".to_string(),
            )),
            (false, _, None) => Err(DetectError::InvalidResponse(
                "Not-found result without a description".to_string(),
            )),
            _ => Err(DetectError::InvalidResponse(
                "Result mixes found and not-found fields".to_string(),
            )),
        }
    }
}

impl From<&Detection> for RawDetection {
    fn from(detection: &Detection) -> Self {
        match detection {
            Detection::Found { position } => RawDetection {
                found: true,
                position: Some(*position),
                description: None,
            },
            Detection::NotFound { description } => RawDetection {
                found: false,
                position: None,
                description: Some(description.clone()),
            },
        }
    }
}

impl Serialize for Detection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RawDetection::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Detection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawDetection::deserialize(deserializer)?;
        raw.try_into().map_err(serde::de::Error::custom)
    }
}

/// Binary image payload handed to the detection client.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Original file name, used for the multipart part.
    pub name: String,
    /// MIME type reported by the intake path, e.g. `image/png`.
    pub media_type: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

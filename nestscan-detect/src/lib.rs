//! nestscan-detect: Detection client for NestScan
//!
//! Talks to a hosted multimodal chat-completion endpoint with a fixed
//! prompt that constrains the model to a strict two-shape JSON answer
//! (bounding box or textual description), and to an image-hosting service
//! for turning uploaded files into fetchable URLs.
//!
//! All transport, parse, and schema failures are absorbed at the
//! [`Detector`] boundary and mapped to a degraded not-found result, so the
//! view layer never handles a raw network error.

pub mod client;
pub mod config;
pub mod error;
pub mod hosting;
pub mod result;


pub use client::{Detector, NestDetector};
pub use config::{DetectConfig, Service};
pub use error::{DetectError, Result};
pub use hosting::{HostedImage, HostingClient};
pub use result::{BoundingBox, Detection, ImageFile};

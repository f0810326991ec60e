//! apriltag_service - AprilTag detection over raw pixel buffers
//!
//! Build a [`TagDetectionService`] once for a tag family and border width,
//! then feed it gray, RGB or RGBA frames. Each call returns the recognized
//! tags with their id, bit error count, corners and the homography from the
//! canonical tag square `[-1, 1]^2` into the image.
//!
//! ```
//! use apriltag_service::{DetectorOptions, TagDetectionService};
//!
//! let service = TagDetectionService::new("36h11", DetectorOptions::with_black_border(2))?;
//! let frame = vec![255u8; 320 * 240 * 3];
//! for tag in &service.detect(&frame, 320, 240)? {
//!     println!("tag {} at {:?}", tag.id, tag.center);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Environment-tunable defaults and host options
pub mod config;
/// Tag families, codeword tables and matching
pub mod decoder;
/// Candidate extraction (components, quads, cell sampling)
pub mod detector;
/// Detection engine trait and the built-in quad decoder
pub mod engine;
/// Error types
pub mod error;
/// Core data structures (images, points, detections)
pub mod models;
/// Buffer layout inference and luma conversion
pub mod normalizer;
/// The detection service
pub mod service;
/// Synthetic tag rendering
pub mod tools;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use config::{DetectorOptions, EngineParams};
pub use decoder::{FamilyRegistry, TagFamily, supported_families};
pub use engine::{DetectionEngine, QuadDecoder, TAG_FRAME_CORNERS};
pub use error::{ConfigError, DetectError, EngineError};
pub use models::{DetectionResult, GrayImage, Point, RawDetection, TagRecord};
pub use normalizer::{PixelLayout, normalize};
pub use service::{TagDetectionService, TagFamilyConfig};
pub use utils::geometry::Homography;

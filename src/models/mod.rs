//! Core data structures shared across the pipeline

/// Engine detections and host-facing records
pub mod detection;
/// Luma frames and bilinear sampling
pub mod image;
/// Bit-packed binary frames
pub mod matrix;
/// 2D points
pub mod point;

pub use detection::{DetectionResult, RawDetection, TagRecord};
pub use image::{GrayImage, GrayImageView, sample_bilinear};
pub use matrix::BitMatrix;
pub use point::Point;

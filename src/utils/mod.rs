//! Utility functions for image processing
//!
//! This module provides helper functions for tag detection:
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Binarization (Otsu's method and threshold-based)
//! - Geometry (homographies, line fits, polygon measures)

/// Otsu threshold and global binarization
pub mod binarization;
/// Homographies, line fits and polygon measures
pub mod geometry;
/// Fixed-point RGB/RGBA to luma
pub mod grayscale;

//! Tag candidate detection
//!
//! This module finds and reads square markers in a binarized frame:
//! - Connected components of dark pixels (tag candidates)
//! - Quad fitting on each component's outer boundary
//! - Cell sampling through the quad homography

/// 8-connected labeling of dark pixels
pub mod connected_components;
/// Four-sided outline fitting with sub-pixel corners
pub mod quad;
/// Border check and payload bit reading
pub mod sampler;

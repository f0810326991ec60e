//! Raw pixel buffers to owned luma frames.
//!
//! The layout of a buffer is inferred from its length alone, checked in the
//! order gray, RGB, RGBA. No format tag travels with the bytes.

use log::trace;

use crate::config;
use crate::error::DetectError;
use crate::models::GrayImage;
use crate::utils::grayscale::{
    rgb_to_grayscale, rgb_to_grayscale_parallel, rgba_to_grayscale, rgba_to_grayscale_parallel,
};

/// Byte layout of an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// One luma byte per pixel
    Gray,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue and an ignored fourth byte
    Rgba,
}

impl PixelLayout {
    /// Bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }

    /// Layout whose size matches `len` bytes for a `width` x `height` frame.
    pub fn infer(len: usize, width: usize, height: usize) -> Result<Self, DetectError> {
        let pixels = pixel_count(width, height)?;
        [PixelLayout::Gray, PixelLayout::Rgb, PixelLayout::Rgba]
            .into_iter()
            .find(|layout| pixels.checked_mul(layout.channels()) == Some(len))
            .ok_or(DetectError::InvalidBufferSize {
                len,
                width,
                height,
                expected: [pixels, pixels.saturating_mul(3), pixels.saturating_mul(4)],
            })
    }
}

fn pixel_count(width: usize, height: usize) -> Result<usize, DetectError> {
    if width == 0 {
        return Err(DetectError::invalid_argument("width", "must be a positive integer"));
    }
    if height == 0 {
        return Err(DetectError::invalid_argument("height", "must be a positive integer"));
    }
    width.checked_mul(height).ok_or_else(|| {
        DetectError::invalid_argument("height", format!("{width}x{height} pixels overflow usize"))
    })
}

/// Convert `buffer` into an owned `width` x `height` luma frame.
///
/// Gray input is copied, color input goes through the fixed-point luma
/// weights. The source buffer is never aliased.
pub fn normalize(buffer: &[u8], width: usize, height: usize) -> Result<GrayImage, DetectError> {
    normalize_with_threshold(buffer, width, height, config::parallel_min_pixels())
}

/// [`normalize`] with an explicit pixel count above which color conversion
/// runs row-parallel.
pub fn normalize_with_threshold(
    buffer: &[u8],
    width: usize,
    height: usize,
    parallel_min_pixels: usize,
) -> Result<GrayImage, DetectError> {
    let layout = PixelLayout::infer(buffer.len(), width, height)?;
    let parallel = width * height >= parallel_min_pixels;
    trace!("normalizing {width}x{height} {layout:?} buffer (parallel: {parallel})");

    let data = match (layout, parallel) {
        (PixelLayout::Gray, _) => buffer.to_vec(),
        (PixelLayout::Rgb, false) => rgb_to_grayscale(buffer, width, height),
        (PixelLayout::Rgb, true) => rgb_to_grayscale_parallel(buffer, width, height),
        (PixelLayout::Rgba, false) => rgba_to_grayscale(buffer, width, height),
        (PixelLayout::Rgba, true) => rgba_to_grayscale_parallel(buffer, width, height),
    };

    Ok(GrayImage {
        width,
        height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_follow_priority_order() {
        assert_eq!(PixelLayout::infer(12, 4, 3), Ok(PixelLayout::Gray));
        assert_eq!(PixelLayout::infer(36, 4, 3), Ok(PixelLayout::Rgb));
        assert_eq!(PixelLayout::infer(48, 4, 3), Ok(PixelLayout::Rgba));
        // 1x3 RGB and 3x1 gray are both 3 bytes; the declared size decides
        assert_eq!(PixelLayout::infer(3, 1, 1), Ok(PixelLayout::Rgb));
        assert_eq!(PixelLayout::infer(3, 3, 1), Ok(PixelLayout::Gray));
    }

    #[test]
    fn other_sizes_report_expected_lengths() {
        assert_eq!(
            PixelLayout::infer(13, 4, 3),
            Err(DetectError::InvalidBufferSize {
                len: 13,
                width: 4,
                height: 3,
                expected: [12, 36, 48],
            })
        );
        assert!(matches!(
            PixelLayout::infer(0, 4, 3),
            Err(DetectError::InvalidBufferSize { .. })
        ));
    }

    #[test]
    fn zero_and_overflowing_dimensions_are_invalid_arguments() {
        assert!(matches!(
            normalize(&[], 0, 3),
            Err(DetectError::InvalidArgument { argument: "width", .. })
        ));
        assert!(matches!(
            normalize(&[], 3, 0),
            Err(DetectError::InvalidArgument { argument: "height", .. })
        ));
        assert!(matches!(
            normalize(&[0], usize::MAX, 2),
            Err(DetectError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn gray_is_copied_verbatim() {
        let buffer: Vec<u8> = (0..12).collect();
        let image = normalize(&buffer, 4, 3).expect("normalize");
        assert_eq!(image.data, buffer);
        assert_ne!(image.data.as_ptr(), buffer.as_ptr());
        assert_eq!((image.width, image.height), (4, 3));
    }

    #[test]
    fn color_layouts_agree_on_gray_content() {
        let gray: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let rgb: Vec<u8> = gray.iter().flat_map(|&v| [v, v, v]).collect();
        let rgba: Vec<u8> = gray.iter().flat_map(|&v| [v, v, v, 17]).collect();

        let from_gray = normalize(&gray, 8, 8).expect("gray");
        assert_eq!(normalize(&rgb, 8, 8).expect("rgb"), from_gray);
        assert_eq!(normalize(&rgba, 8, 8).expect("rgba"), from_gray);
        assert_eq!(normalize_with_threshold(&rgb, 8, 8, 1).expect("par"), from_gray);
        assert_eq!(normalize_with_threshold(&rgba, 8, 8, 1).expect("par"), from_gray);
    }

    #[test]
    fn rgb_uses_perceptual_weights() {
        let image = normalize(&[255, 0, 0, 0, 255, 0, 0, 0, 255], 3, 1).expect("rgb");
        assert_eq!(image.data, vec![76, 150, 29]);
    }
}

//! Synthetic frame rendering for tests and benchmarks.
//!
//! Tags are drawn through the homography from the canonical tag frame to
//! four caller-chosen image corners, with a light ring one cell wide around
//! the dark border as printed markers have.

use image::{DynamicImage, Luma};

use crate::decoder::TagFamily;
use crate::engine::TAG_FRAME_CORNERS;
use crate::models::{GrayImage, Point};
use crate::utils::geometry::Homography;

const DARK: u8 = 0;
const LIGHT: u8 = 255;

/// Reasons a tag cannot be drawn.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The family has no codeword for the id
    #[error("family {family} has no tag id {id}")]
    UnknownId {
        /// Family name
        family: &'static str,
        /// Requested id, at or past the family size
        id: u32,
    },
    /// Corners are collinear or coincide
    #[error("tag corners do not span a quad")]
    DegenerateQuad,
}

/// Corners of an upright `side` px tag whose top-left pixel is `(x0, y0)`.
///
/// Pixel centres sit on integers, so the outline runs half a pixel outside
/// the covered pixels.
pub fn axis_aligned_corners(x0: f64, y0: f64, side: f64) -> [Point; 4] {
    let (lo_x, lo_y) = (x0 - 0.5, y0 - 0.5);
    [
        Point::new(lo_x, lo_y),
        Point::new(lo_x + side, lo_y),
        Point::new(lo_x + side, lo_y + side),
        Point::new(lo_x, lo_y + side),
    ]
}

/// Corners of a `side` px tag centred on `center`, turned by `angle`
/// radians (clockwise on screen).
pub fn rotated_corners(center: Point, side: f64, angle: f64) -> [Point; 4] {
    let (s, c) = angle.sin_cos();
    let half = side / 2.0;
    TAG_FRAME_CORNERS.map(|p| {
        let (u, v) = (p.x * half, p.y * half);
        Point::new(center.x + c * u - s * v, center.y + s * u + c * v)
    })
}

/// Mutable luma frame to draw tags on.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: GrayImage,
}

impl Canvas {
    /// `width` x `height` frame filled with `background`
    pub fn new(width: usize, height: usize, background: u8) -> Self {
        Self {
            image: GrayImage::filled(width, height, background),
        }
    }

    /// Current frame
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Take the frame
    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Draw tag `id` of `family` with `black_border` dark rings so that
    /// canonical corner `i` lands on `corners[i]`.
    pub fn draw_tag(
        &mut self,
        family: &TagFamily,
        id: u32,
        black_border: u32,
        corners: &[Point; 4],
    ) -> Result<(), RenderError> {
        let code = family.code(id).ok_or(RenderError::UnknownId {
            family: family.name,
            id,
        })?;
        let to_tag =
            Homography::from_points(corners, &TAG_FRAME_CORNERS).ok_or(RenderError::DegenerateQuad)?;
        let to_image =
            Homography::from_points(&TAG_FRAME_CORNERS, corners).ok_or(RenderError::DegenerateQuad)?;

        let bits = family.bits_per_side;
        let border = black_border as usize;
        let cells = bits + 2 * border;
        let cell = 2.0 / cells as f64;
        let reach = 1.0 + cell;

        // Pixel bounds of the tag plus its light ring
        let outline = TAG_FRAME_CORNERS.map(|p| to_image.project(&Point::new(p.x * reach, p.y * reach)));
        let min_x = outline.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
        let min_y = outline.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
        let max_x = (outline.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max).ceil() as usize)
            .min(self.image.width.saturating_sub(1));
        let max_y = (outline.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).ceil() as usize)
            .min(self.image.height.saturating_sub(1));

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let t = to_tag.project(&Point::new(x as f64, y as f64));
                if !(t.x.abs() < reach && t.y.abs() < reach) {
                    continue;
                }
                let value = if t.x.abs() >= 1.0 || t.y.abs() >= 1.0 {
                    LIGHT
                } else {
                    let gx = (((t.x + 1.0) / cell) as usize).min(cells - 1);
                    let gy = (((t.y + 1.0) / cell) as usize).min(cells - 1);
                    let in_border =
                        gx < border || gy < border || gx >= cells - border || gy >= cells - border;
                    if in_border {
                        DARK
                    } else {
                        let bit = (gy - border) * bits + (gx - border);
                        if code >> bit & 1 == 1 { LIGHT } else { DARK }
                    }
                };
                self.image.set(x, y, value);
            }
        }
        Ok(())
    }

    /// Frame as an `image` crate buffer.
    pub fn to_dynamic(&self) -> DynamicImage {
        let img = &self.image;
        DynamicImage::ImageLuma8(image::GrayImage::from_fn(
            img.width as u32,
            img.height as u32,
            |x, y| Luma([img.get(x as usize, y as usize)]),
        ))
    }

    /// Same frame as interleaved RGB bytes.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.to_dynamic().to_rgb8().into_raw()
    }

    /// Same frame as interleaved RGBA bytes, alpha opaque.
    pub fn rgba_bytes(&self) -> Vec<u8> {
        self.to_dynamic().to_rgba8().into_raw()
    }

    /// Colour rendition with every luma value replaced by `palette(value)`.
    pub fn to_rgb_image(&self, palette: impl Fn(u8) -> [u8; 3]) -> image::RgbImage {
        let img = &self.image;
        image::RgbImage::from_fn(img.width as u32, img.height as u32, |x, y| {
            image::Rgb(palette(img.get(x as usize, y as usize)))
        })
    }
}

//! Owned single-channel luminance surface.

/// Borrowed luminance view, row-major, `data.len() == width * height`.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Luma bytes, row-major
    pub data: &'a [u8],
}

/// Owned 8-bit luminance image. Never aliases a caller buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Luma bytes, row-major
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Uniform image filled with `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Borrow as a view
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Luma at `(x, y)`; panics out of bounds
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Overwrite luma at `(x, y)`
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// `(min, max)` luma over the whole image, `None` when empty.
    pub fn luma_range(&self) -> Option<(u8, u8)> {
        let min = *self.data.iter().min()?;
        let max = *self.data.iter().max()?;
        Some((min, max))
    }
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i64, y: i64) -> u8 {
    let x = x.clamp(0, src.width as i64 - 1);
    let y = y.clamp(0, src.height as i64 - 1);
    src.data[y as usize * src.width + x as usize]
}

/// Bilinear sample with edge clamping; pixel centres are at integer coordinates.
#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f64, y: f64) -> f64 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_gray(src, x0, y0) as f64;
    let p10 = get_gray(src, x0 + 1, y0) as f64;
    let p01 = get_gray(src, x0, y0 + 1) as f64;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f64;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_hits_pixel_centres_and_midpoints() {
        let img = GrayImage {
            width: 2,
            height: 1,
            data: vec![0, 200],
        };
        let view = img.view();
        assert_eq!(sample_bilinear(&view, 0.0, 0.0), 0.0);
        assert_eq!(sample_bilinear(&view, 1.0, 0.0), 200.0);
        assert_eq!(sample_bilinear(&view, 0.5, 0.0), 100.0);
        // Clamped outside the frame.
        assert_eq!(sample_bilinear(&view, 5.0, 3.0), 200.0);
    }

    #[test]
    fn luma_range_reports_extremes() {
        let mut img = GrayImage::filled(3, 3, 40);
        img.set(2, 1, 220);
        assert_eq!(img.get(2, 1), 220);
        assert_eq!(img.luma_range(), Some((40, 220)));
        assert_eq!(GrayImage::filled(0, 0, 0).luma_range(), None);
    }
}

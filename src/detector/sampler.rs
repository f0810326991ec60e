/// Bit-cell sampling through a tag homography
///
/// The canonical tag square `[-1, 1]^2` is divided into
/// `bits_per_side + 2 * black_border` cells per side. Border cells must be
/// dark, the ring of cells just outside the square must be light, and the
/// payload cells are read against the midpoint of the two.
use crate::models::{GrayImageView, Point, sample_bilinear};
use crate::utils::geometry::Homography;

/// Sub-cell offsets averaged per cell, as fractions of a cell
const CELL_OFFSETS: [(f64, f64); 5] = [(0.0, 0.0), (-0.2, -0.2), (0.2, -0.2), (-0.2, 0.2), (0.2, 0.2)];

/// Cell layout of one tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrid {
    /// Payload cells per side
    pub bits_per_side: usize,
    /// Dark rings around the payload
    pub black_border: usize,
}

impl CellGrid {
    /// Grid of `bits_per_side` payload cells inside `black_border` rings
    pub fn new(bits_per_side: usize, black_border: usize) -> Self {
        Self {
            bits_per_side,
            black_border,
        }
    }

    /// Cells per side including the border, saturating at `usize::MAX`
    #[inline]
    pub fn cells(&self) -> usize {
        self.checked_cells().unwrap_or(usize::MAX)
    }

    /// Cells per side, `None` when the count overflows
    pub fn checked_cells(&self) -> Option<usize> {
        self.black_border
            .checked_mul(2)?
            .checked_add(self.bits_per_side)
    }

    /// Canonical coordinate of the centre of cell `g`; `g` may lie one cell
    /// outside the grid
    #[inline]
    pub fn cell_center(&self, g: i64) -> f64 {
        -1.0 + (g as f64 + 0.5) * 2.0 / self.cells() as f64
    }

    fn is_border(&self, gx: usize, gy: usize) -> bool {
        let b = self.black_border;
        let n = self.cells();
        gx < b || gy < b || gx >= n - b || gy >= n - b
    }
}

/// Sampled payload of one quad orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Payload bits, `1` = light cell, bit `row * n + col`
    pub code: u64,
    /// Mean luma of the border cells
    pub black: f64,
    /// Mean luma of the ring outside the tag
    pub white: f64,
    /// Fraction of border cells below the threshold
    pub border_dark_ratio: f64,
}

/// Reads cells of one image through tag homographies
pub struct CellSampler<'a> {
    image: GrayImageView<'a>,
    grid: CellGrid,
}

impl<'a> CellSampler<'a> {
    /// Sampler over `image` for tags laid out as `grid`
    pub fn new(image: GrayImageView<'a>, grid: CellGrid) -> Self {
        Self { image, grid }
    }

    /// Cell layout this sampler reads
    pub fn grid(&self) -> CellGrid {
        self.grid
    }

    fn cell_value(&self, h: &Homography, gx: i64, gy: i64) -> f64 {
        let step = 2.0 / self.grid.cells() as f64;
        let cx = self.grid.cell_center(gx);
        let cy = self.grid.cell_center(gy);
        let sum: f64 = CELL_OFFSETS
            .iter()
            .map(|&(dx, dy)| {
                let p = h.project(&Point::new(cx + dx * step, cy + dy * step));
                if !(p.x.is_finite() && p.y.is_finite()) {
                    return f64::NAN;
                }
                sample_bilinear(&self.image, p.x, p.y)
            })
            .sum();
        sum / CELL_OFFSETS.len() as f64
    }

    /// Sample every cell of the tag under `h`.
    ///
    /// Returns `None` when the homography sends a cell off to infinity, when
    /// the white/black difference is below `min_contrast`, or when fewer than
    /// `min_border_dark_ratio` of the border cells read dark.
    pub fn read(&self, h: &Homography, min_contrast: f64, min_border_dark_ratio: f64) -> Option<Reading> {
        if self.image.width == 0 || self.image.height == 0 {
            return None;
        }
        let n = self.grid.checked_cells()?;
        let ni = i64::try_from(n).ok()?;

        let mut values = vec![0.0f64; n.checked_mul(n)?];
        for gy in 0..n {
            for gx in 0..n {
                let v = self.cell_value(h, gx as i64, gy as i64);
                if !v.is_finite() {
                    return None;
                }
                values[gy * n + gx] = v;
            }
        }

        let (mut black_sum, mut black_count) = (0.0, 0usize);
        for gy in 0..n {
            for gx in 0..n {
                if self.grid.is_border(gx, gy) {
                    black_sum += values[gy * n + gx];
                    black_count += 1;
                }
            }
        }

        let (mut white_sum, mut white_count) = (0.0, 0usize);
        for gy in -1..=ni {
            for gx in -1..=ni {
                let on_ring = gx == -1 || gy == -1 || gx == ni || gy == ni;
                if !on_ring {
                    continue;
                }
                let v = self.cell_value(h, gx, gy);
                if !v.is_finite() {
                    return None;
                }
                white_sum += v;
                white_count += 1;
            }
        }

        let black = black_sum / black_count as f64;
        let white = white_sum / white_count as f64;
        if white - black < min_contrast {
            return None;
        }
        let threshold = 0.5 * (white + black);

        let dark_border = (0..n)
            .flat_map(|gy| (0..n).map(move |gx| (gx, gy)))
            .filter(|&(gx, gy)| self.grid.is_border(gx, gy) && values[gy * n + gx] < threshold)
            .count();
        let border_dark_ratio = dark_border as f64 / black_count as f64;
        if border_dark_ratio < min_border_dark_ratio {
            return None;
        }

        let b = self.grid.black_border;
        let bits = self.grid.bits_per_side;
        let mut code = 0u64;
        for row in 0..bits {
            for col in 0..bits {
                if values[(b + row) * n + b + col] > threshold {
                    code |= 1u64 << (row * bits + col);
                }
            }
        }

        Some(Reading {
            code,
            black,
            white,
            border_dark_ratio,
        })
    }
}

//! Dark/light pixel mask packed 64 pixels per word.
//!
//! Each row starts on a fresh word so rows can be filled independently.

use rayon::prelude::*;

/// Binary frame, `true` = dark pixel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    /// Words per row
    stride: usize,
    words: Vec<u64>,
}

impl BitMatrix {
    /// All-light `width` x `height` mask
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(64);
        Self {
            width,
            height,
            stride,
            words: vec![0; stride * height],
        }
    }

    /// Mask with pixel `(x, y)` dark where `dark(x, y)` holds
    pub fn from_fn(width: usize, height: usize, dark: impl Fn(usize, usize) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        if mask.stride > 0 {
            for (y, row) in mask.words.chunks_mut(mask.stride).enumerate() {
                pack_row(row, width, |x| dark(x, y));
            }
        }
        mask
    }

    /// [`from_fn`](Self::from_fn) with rows packed in parallel
    pub fn from_fn_parallel(
        width: usize,
        height: usize,
        dark: impl Fn(usize, usize) -> bool + Sync,
    ) -> Self {
        let mut mask = Self::new(width, height);
        if mask.stride > 0 {
            let stride = mask.stride;
            mask.words
                .par_chunks_mut(stride)
                .enumerate()
                .for_each(|(y, row)| pack_row(row, width, |x| dark(x, y)));
        }
        mask
    }

    /// Columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Word index and bit of `(x, y)`, `None` outside the frame
    #[inline]
    fn locate(&self, x: usize, y: usize) -> Option<(usize, u64)> {
        (x < self.width && y < self.height).then(|| (y * self.stride + x / 64, 1u64 << (x % 64)))
    }

    /// Whether `(x, y)` is dark; outside the frame counts as light
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.locate(x, y)
            .is_some_and(|(word, bit)| self.words[word] & bit != 0)
    }

    /// Mark `(x, y)` dark or light; ignored outside the frame
    pub fn set(&mut self, x: usize, y: usize, dark: bool) {
        if let Some((word, bit)) = self.locate(x, y) {
            if dark {
                self.words[word] |= bit;
            } else {
                self.words[word] &= !bit;
            }
        }
    }
}

fn pack_row(row: &mut [u64], width: usize, dark: impl Fn(usize) -> bool) {
    for x in (0..width).filter(|&x| dark(x)) {
        row[x / 64] |= 1u64 << (x % 64);
    }
}

/// Colour to luminance conversion kernels
///
/// Y = 0.299*R + 0.587*G + 0.114*B in 14-bit fixed point with rounding:
/// Y = (4899*R + 9617*G + 1868*B + 8192) >> 14
///
/// The weights sum to 2^14, so grey pixels (R = G = B) keep their value
/// exactly. Any channel past the third (alpha) is ignored.
use rayon::prelude::*;

const COEF_R: u32 = 4899;
const COEF_G: u32 = 9617;
const COEF_B: u32 = 1868;
const SHIFT: u32 = 14;
const ROUND: u32 = 1 << (SHIFT - 1);

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32 + ROUND) >> SHIFT) as u8
}

#[inline]
fn convert_row(src: &[u8], dst: &mut [u8], channels: usize) {
    for (px, out) in src.chunks_exact(channels).zip(dst.iter_mut()) {
        *out = luma(px[0], px[1], px[2]);
    }
}

fn convert(src: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }
    for (src_row, dst_row) in src.chunks_exact(width * channels).zip(gray.chunks_exact_mut(width)) {
        convert_row(src_row, dst_row, channels);
    }
    gray
}

fn convert_parallel(src: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }
    gray.par_chunks_mut(width)
        .zip(src.par_chunks(width * channels))
        .for_each(|(dst_row, src_row)| convert_row(src_row, dst_row, channels));
    gray
}

/// Convert an RGB image (3 bytes per pixel) to luminance
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgb, width, height, 3)
}

/// Convert an RGBA image (4 bytes per pixel) to luminance, ignoring alpha
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert(rgba, width, height, 4)
}

/// Convert RGB to grayscale processing rows in parallel
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_parallel(rgb, width, height, 3)
}

/// Convert RGBA to grayscale processing rows in parallel
pub fn rgba_to_grayscale_parallel(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_parallel(rgba, width, height, 4)
}

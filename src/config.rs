//! Service options and engine tunables.
//!
//! Engine defaults can be overridden once per process through `APRILTAG_*`
//! environment variables; they are read on first use.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

static MIN_WHITE_BLACK_DIFF: OnceLock<u8> = OnceLock::new();

pub(crate) fn min_white_black_diff() -> u8 {
    *MIN_WHITE_BLACK_DIFF.get_or_init(|| parse_env("APRILTAG_MIN_WHITE_BLACK_DIFF", 20).max(1))
}

static MIN_TAG_SIDE_PX: OnceLock<f64> = OnceLock::new();

pub(crate) fn min_tag_side_px() -> f64 {
    *MIN_TAG_SIDE_PX.get_or_init(|| parse_env("APRILTAG_MIN_TAG_SIDE_PX", 10.0f64).max(4.0))
}

static ERROR_RECOVERY_BITS: OnceLock<u32> = OnceLock::new();

pub(crate) fn error_recovery_bits() -> u32 {
    *ERROR_RECOVERY_BITS.get_or_init(|| parse_env("APRILTAG_ERROR_RECOVERY_BITS", 1))
}

static KEEP_INVALID: OnceLock<bool> = OnceLock::new();

pub(crate) fn keep_invalid() -> bool {
    *KEEP_INVALID.get_or_init(|| parse_env_bool_u8("APRILTAG_KEEP_INVALID", false))
}

static PARALLEL_MIN_PIXELS: OnceLock<usize> = OnceLock::new();

pub(crate) fn parallel_min_pixels() -> usize {
    *PARALLEL_MIN_PIXELS.get_or_init(|| parse_env("APRILTAG_PARALLEL_MIN_PIXELS", 1usize << 20))
}

/// Host-facing construction options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorOptions {
    /// Solid border rings around the payload on the printed marker.
    /// `None` keeps the family default; dual-border sheets use 2.
    pub black_border: Option<i64>,
}

impl DetectorOptions {
    /// Options overriding the border width
    pub fn with_black_border(black_border: i64) -> Self {
        Self {
            black_border: Some(black_border),
        }
    }
}

/// Tunables of the built-in quad decoding engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Minimum luma difference between the white and black references of a
    /// frame or a tag; lower contrast yields no detections.
    pub min_white_black_diff: u8,
    /// Smallest accepted quad side, in pixels.
    pub min_tag_side_px: f64,
    /// Dark components with fewer pixels are ignored.
    pub min_component_pixels: usize,
    /// Detections with at most this many bit errors are flagged `good`.
    pub error_recovery_bits: u32,
    /// Emit decoded detections that are not `good` as well.
    pub keep_invalid: bool,
    /// Fraction of border cells that must sample dark.
    pub min_border_dark_ratio: f64,
    /// Frames with at least this many pixels are thresholded row-parallel.
    pub parallel_min_pixels: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            min_white_black_diff: min_white_black_diff(),
            min_tag_side_px: min_tag_side_px(),
            min_component_pixels: 24,
            error_recovery_bits: error_recovery_bits(),
            keep_invalid: keep_invalid(),
            min_border_dark_ratio: 0.85,
            parallel_min_pixels: parallel_min_pixels(),
        }
    }
}

//! Detection engines: canonical luma frame in, raw tag detections out.
//!
//! [`QuadDecoder`] is the built-in engine. It thresholds the frame, fits a
//! quad to each dark blob and reads the cell grid through the quad
//! homography in all four orientations.

use log::{debug, trace};
use rayon::prelude::*;

use crate::config::EngineParams;
use crate::decoder::{Matcher, TagFamily};
use crate::detector::connected_components::{Component, find_dark_components};
use crate::detector::quad::{Quad, fit_quad};
use crate::detector::sampler::{CellGrid, CellSampler};
use crate::error::EngineError;
use crate::models::{GrayImage, Point, RawDetection};
use crate::utils::binarization::{otsu_threshold, threshold_binarize, threshold_binarize_parallel};
use crate::utils::geometry::{Homography, perimeter};

/// Corners of the canonical tag frame, in the order detections report them.
pub const TAG_FRAME_CORNERS: [Point; 4] = [
    Point { x: -1.0, y: -1.0 },
    Point { x: 1.0, y: -1.0 },
    Point { x: 1.0, y: 1.0 },
    Point { x: -1.0, y: 1.0 },
];

/// A tag recognizer over single-channel frames.
///
/// Implementations return detections in their own emission order; callers
/// must not rely on any sorting.
pub trait DetectionEngine {
    /// Recognize every tag in `image`.
    fn extract_tags(&self, image: &GrayImage) -> Result<Vec<RawDetection>, EngineError>;
}

impl<E: DetectionEngine + ?Sized> DetectionEngine for Box<E> {
    fn extract_tags(&self, image: &GrayImage) -> Result<Vec<RawDetection>, EngineError> {
        (**self).extract_tags(image)
    }
}

/// Quad-based decoder for one tag family and border width.
///
/// Immutable after construction; one instance may serve any number of
/// frames.
#[derive(Debug, Clone)]
pub struct QuadDecoder {
    matcher: Matcher,
    grid: CellGrid,
    black_border: u32,
    params: EngineParams,
}

struct Candidate {
    detection: RawDetection,
    perimeter: f64,
    min_side: f64,
}

impl QuadDecoder {
    /// Decoder for `family` markers printed with `black_border` solid rings.
    pub fn new(family: &'static TagFamily, black_border: u32, params: EngineParams) -> Self {
        let max_hamming = if params.keep_invalid {
            family.max_correctable()
        } else {
            params.error_recovery_bits.min(family.max_correctable())
        };
        Self {
            matcher: Matcher::new(family, max_hamming),
            grid: CellGrid::new(family.bits_per_side, black_border as usize),
            black_border,
            params,
        }
    }

    /// Family whose codewords this decoder matches
    pub fn family(&self) -> &'static TagFamily {
        self.matcher.family()
    }

    /// Dark rings expected around the payload
    pub fn black_border(&self) -> u32 {
        self.black_border
    }

    /// Tunables fixed at construction
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Best decoding of one quad over the four corner rotations
    fn decode_quad(&self, sampler: &CellSampler<'_>, quad: &Quad) -> Option<RawDetection> {
        let mut best: Option<(u32, u32, [Point; 4], Homography)> = None;
        for shift in 0..4 {
            let corners = quad.shifted(shift);
            let Some(h) = Homography::from_points(&TAG_FRAME_CORNERS, &corners) else {
                continue;
            };
            let Some(reading) = sampler.read(
                &h,
                f64::from(self.params.min_white_black_diff),
                self.params.min_border_dark_ratio,
            ) else {
                continue;
            };
            let Some(m) = self.matcher.match_code(reading.code) else {
                trace!("shift {shift}: code {:#x} matches nothing", reading.code);
                continue;
            };
            if best.is_none_or(|(_, hamming, _, _)| m.hamming < hamming) {
                best = Some((m.id, m.hamming, corners, h));
            }
        }

        let (id, hamming_distance, corners, homography) = best?;
        let good = hamming_distance <= self.params.error_recovery_bits;
        if !good && !self.params.keep_invalid {
            return None;
        }
        Some(RawDetection {
            id,
            hamming_distance,
            good,
            center: homography.project(&Point::new(0.0, 0.0)),
            corners,
            homography,
        })
    }

    fn candidate(&self, sampler: &CellSampler<'_>, component: &Component) -> Option<Candidate> {
        let quad = fit_quad(component, self.params.min_tag_side_px)?;
        // Needs at least one pixel per cell
        if quad.min_side() < self.grid.cells() as f64 {
            trace!("quad side {:.1} px too short for {} cells", quad.min_side(), self.grid.cells());
            return None;
        }
        let detection = self.decode_quad(sampler, &quad)?;
        trace!(
            "tag {} (hamming {}) at ({:.1}, {:.1})",
            detection.id, detection.hamming_distance, detection.center.x, detection.center.y
        );
        Some(Candidate {
            perimeter: perimeter(&quad.corners),
            min_side: quad.min_side(),
            detection,
        })
    }
}

impl DetectionEngine for QuadDecoder {
    fn extract_tags(&self, image: &GrayImage) -> Result<Vec<RawDetection>, EngineError> {
        let (width, height) = (image.width, image.height);
        let expected = width * height;
        if image.data.len() != expected {
            return Err(EngineError::ImageSize {
                len: image.data.len(),
                width,
                height,
                expected,
            });
        }

        let Some((lo, hi)) = image.luma_range() else {
            return Ok(Vec::new());
        };
        if hi - lo < self.params.min_white_black_diff {
            debug!("frame contrast {} below {}, skipping", hi - lo, self.params.min_white_black_diff);
            return Ok(Vec::new());
        }

        let threshold = otsu_threshold(&image.data);
        let binary = if expected >= self.params.parallel_min_pixels {
            threshold_binarize_parallel(&image.data, width, height, threshold)
        } else {
            threshold_binarize(&image.data, width, height, threshold)
        };
        debug!("{width}x{height} frame, otsu threshold {threshold}");

        let components: Vec<Component> =
            find_dark_components(&binary, self.params.min_component_pixels)
                .into_iter()
                .filter(|c| !c.touches_frame(width, height))
                .collect();
        debug!("{} dark components", components.len());

        let sampler = CellSampler::new(image.view(), self.grid);
        let candidates: Vec<Candidate> = components
            .par_iter()
            .filter_map(|c| self.candidate(&sampler, c))
            .collect();

        let detections = suppress_overlaps(candidates);
        debug!("{} tags decoded", detections.len());
        Ok(detections)
    }
}

/// Drop duplicate reads of the same tag.
///
/// Two candidates collide when they share an id and their centres are closer
/// than half the smaller of their shortest sides. The survivor has the lower
/// Hamming distance, then the larger perimeter, then came first. Survivors
/// keep their relative order.
fn suppress_overlaps(candidates: Vec<Candidate>) -> Vec<RawDetection> {
    let beats = |a: &Candidate, ai: usize, b: &Candidate, bi: usize| {
        let (ha, hb) = (a.detection.hamming_distance, b.detection.hamming_distance);
        if ha != hb {
            return ha < hb;
        }
        if a.perimeter != b.perimeter {
            return a.perimeter > b.perimeter;
        }
        ai < bi
    };

    let keep: Vec<bool> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            !candidates.iter().enumerate().any(|(j, other)| {
                j != i
                    && other.detection.id == c.detection.id
                    && other.detection.center.distance(&c.detection.center)
                        < 0.5 * other.min_side.min(c.min_side)
                    && beats(other, j, c, i)
            })
        })
        .collect();

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c.detection))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::FamilyRegistry;
    use crate::tools::{Canvas, axis_aligned_corners};

    fn decoder(black_border: u32) -> QuadDecoder {
        let family = FamilyRegistry::builtin().resolve("36h11").expect("36h11");
        QuadDecoder::new(family, black_border, EngineParams::default())
    }

    fn candidate(id: u32, hamming: u32, x: f64, side: f64) -> Candidate {
        let corners = axis_aligned_corners(x, 0.0, side);
        Candidate {
            detection: RawDetection {
                id,
                hamming_distance: hamming,
                good: hamming == 0,
                center: Point::new(x + side / 2.0, side / 2.0),
                corners,
                homography: Homography::identity(),
            },
            perimeter: 4.0 * side,
            min_side: side,
        }
    }

    #[test]
    fn blank_frames_yield_nothing() {
        let d = decoder(1);
        for value in [0u8, 128, 255] {
            let frame = GrayImage::filled(64, 48, value);
            assert!(d.extract_tags(&frame).expect("extract").is_empty());
        }
    }

    #[test]
    fn image_size_is_checked() {
        let frame = GrayImage {
            width: 10,
            height: 10,
            data: vec![0; 99],
        };
        assert_eq!(
            decoder(1).extract_tags(&frame),
            Err(EngineError::ImageSize {
                len: 99,
                width: 10,
                height: 10,
                expected: 100
            })
        );
    }

    #[test]
    fn decodes_rendered_tag_with_canonical_corners() {
        let family = FamilyRegistry::builtin().resolve("36h11").expect("36h11");
        let corners = axis_aligned_corners(30.0, 20.0, 80.0);
        let mut canvas = Canvas::new(140, 130, 255);
        canvas.draw_tag(family, 42, 1, &corners).expect("draw");

        let found = decoder(1).extract_tags(&canvas.into_image()).expect("extract");
        assert_eq!(found.len(), 1);
        let tag = &found[0];
        assert_eq!((tag.id, tag.hamming_distance, tag.good), (42, 0, true));
        for (got, want) in tag.corners.iter().zip(&corners) {
            assert!(got.distance(want) < 0.5, "{got:?} vs {want:?}");
        }
        assert!(tag.center.distance(&Point::new(69.5, 59.5)) < 0.5);
    }

    #[test]
    fn huge_border_skips_quads_without_failing() {
        let family = FamilyRegistry::builtin().resolve("36h11").expect("36h11");
        let mut canvas = Canvas::new(140, 130, 255);
        canvas
            .draw_tag(family, 42, 1, &axis_aligned_corners(30.0, 20.0, 80.0))
            .expect("draw");
        let frame = canvas.into_image();

        for border in [40, 1 << 31, u32::MAX] {
            let found = decoder(border).extract_tags(&frame).expect("extract");
            assert!(found.is_empty(), "border {border}");
        }
    }

    #[test]
    fn overlaps_keep_the_better_read() {
        let kept = suppress_overlaps(vec![
            candidate(7, 1, 0.0, 40.0),
            candidate(3, 0, 100.0, 40.0),
            candidate(7, 0, 2.0, 38.0),
        ]);
        let ids: Vec<(u32, u32)> = kept.iter().map(|d| (d.id, d.hamming_distance)).collect();
        assert_eq!(ids, vec![(3, 0), (7, 0)]);
    }

    #[test]
    fn overlap_ties_prefer_larger_then_earlier() {
        let kept = suppress_overlaps(vec![
            candidate(5, 0, 0.0, 38.0),
            candidate(5, 0, 1.0, 40.0),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].corners[0].x, 0.5);

        let kept = suppress_overlaps(vec![candidate(5, 0, 0.0, 40.0), candidate(5, 0, 0.0, 40.0)]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn distant_duplicates_both_survive() {
        let kept = suppress_overlaps(vec![candidate(9, 0, 0.0, 20.0), candidate(9, 0, 200.0, 20.0)]);
        assert_eq!(kept.len(), 2);
    }
}

/// Quad fitting on the outer boundary of a dark component
use crate::detector::connected_components::Component;
use crate::models::Point;
use crate::utils::geometry::{Line, signed_area2};

/// Largest RMS distance of a side's points from its fitted line
const MAX_SIDE_RMS: f64 = 1.0;
/// Minimum boundary samples per side
const MIN_SIDE_POINTS: usize = 4;

/// Four corners, clockwise in image coordinates (y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Sub-pixel corner positions
    pub corners: [Point; 4],
}

impl Quad {
    /// Shortest side length
    pub fn min_side(&self) -> f64 {
        (0..4)
            .map(|i| self.corners[i].distance(&self.corners[(i + 1) % 4]))
            .fold(f64::INFINITY, f64::min)
    }

    /// Corners rotated so that `corners[0]` is the old `corners[shift]`
    pub fn shifted(&self, shift: usize) -> [Point; 4] {
        std::array::from_fn(|i| self.corners[(i + shift) % 4])
    }

    fn is_convex(&self) -> bool {
        (0..4).all(|i| {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            let c = self.corners[(i + 2) % 4];
            (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x) > 0.0
        })
    }
}

/// Sub-pixel points on the outer boundary: half a pixel outside the extreme
/// dark pixel of every row and column
pub fn boundary_points(component: &Component) -> Vec<Point> {
    let mut points = Vec::with_capacity(2 * (component.width() + component.height()));
    for (i, &(lo, hi)) in component.row_extents.iter().enumerate() {
        let y = (component.min_y + i) as f64;
        points.push(Point::new(lo as f64 - 0.5, y));
        points.push(Point::new(hi as f64 + 0.5, y));
    }
    for (i, &(lo, hi)) in component.col_extents.iter().enumerate() {
        let x = (component.min_x + i) as f64;
        points.push(Point::new(x, lo as f64 - 0.5));
        points.push(Point::new(x, hi as f64 + 0.5));
    }
    points
}

/// Rough corners from extreme points: the farthest point from the centroid,
/// the farthest point from that one, then the extremes on either side of
/// their diagonal
fn rough_corners(points: &[Point]) -> Option<[Point; 4]> {
    let n = points.len() as f64;
    let centroid = Point::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
    );
    let farthest = |from: &Point| {
        points
            .iter()
            .copied()
            .max_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
    };

    let a = farthest(&centroid)?;
    let c = farthest(&a)?;
    if a.distance(&c) < 1.0 {
        return None;
    }
    let diagonal = Line::fit(&[a, c])?;
    let by_side = |a: &Point, b: &Point| diagonal.distance(a).total_cmp(&diagonal.distance(b));
    let b = points.iter().copied().max_by(by_side)?;
    let d = points.iter().copied().min_by(by_side)?;
    if diagonal.distance(&b) < 1.0 || diagonal.distance(&d) > -1.0 {
        return None;
    }
    Some([a, b, c, d])
}

/// Fit a quad to the outer boundary of `component`.
///
/// Returns `None` when the outline is not four straight sides or any side is
/// shorter than `min_side`.
pub fn fit_quad(component: &Component, min_side: f64) -> Option<Quad> {
    let points = boundary_points(component);
    let rough = rough_corners(&points)?;

    let rough_min_side = (0..4)
        .map(|i| rough[i].distance(&rough[(i + 1) % 4]))
        .fold(f64::INFINITY, f64::min);
    if rough_min_side < min_side * 0.5 {
        return None;
    }
    let margin = (0.1 * rough_min_side).max(1.5);

    // Assign points away from the corners to the nearest rough side
    let rough_lines: Vec<Line> = (0..4)
        .map(|i| Line::fit(&[rough[i], rough[(i + 1) % 4]]))
        .collect::<Option<_>>()?;
    let mut sides: [Vec<Point>; 4] = Default::default();
    for p in &points {
        if rough.iter().any(|c| c.distance(p) < margin) {
            continue;
        }
        let nearest = (0..4)
            .min_by(|&i, &j| {
                rough_lines[i]
                    .distance(p)
                    .abs()
                    .total_cmp(&rough_lines[j].distance(p).abs())
            })
            .unwrap_or(0);
        sides[nearest].push(*p);
    }

    let mut lines = Vec::with_capacity(4);
    for side in &sides {
        if side.len() < MIN_SIDE_POINTS {
            return None;
        }
        let line = Line::fit(side)?;
        let rms = (side.iter().map(|p| line.distance(p).powi(2)).sum::<f64>()
            / side.len() as f64)
            .sqrt();
        if rms > MAX_SIDE_RMS {
            return None;
        }
        lines.push(line);
    }

    // Corner i joins side i-1 and side i
    let mut corners = [Point::default(); 4];
    for i in 0..4 {
        corners[i] = lines[(i + 3) % 4].intersect(&lines[i])?;
        if corners[i].distance(&rough[i]) > margin + 2.0 {
            return None;
        }
    }
    if signed_area2(&corners) < 0.0 {
        corners = [corners[0], corners[3], corners[2], corners[1]];
    }

    let quad = Quad { corners };
    if !quad.is_convex() || quad.min_side() < min_side {
        return None;
    }
    Some(quad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::connected_components::find_dark_components;
    use crate::models::BitMatrix;

    fn component_of(matrix: &BitMatrix) -> Component {
        find_dark_components(matrix, 1)
            .into_iter()
            .next()
            .expect("one component")
    }

    #[test]
    fn axis_aligned_square_is_exact() {
        let mut matrix = BitMatrix::new(60, 60);
        for y in 10..40 {
            for x in 15..45 {
                matrix.set(x, y, true);
            }
        }
        let quad = fit_quad(&component_of(&matrix), 10.0).expect("quad");
        let expected = [
            Point::new(14.5, 9.5),
            Point::new(44.5, 9.5),
            Point::new(44.5, 39.5),
            Point::new(14.5, 39.5),
        ];
        for e in expected {
            assert!(
                quad.corners.iter().any(|c| c.distance(&e) < 1e-6),
                "{e:?} not in {:?}",
                quad.corners
            );
        }
        assert!(signed_area2(&quad.corners) > 0.0);
        assert!((quad.min_side() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn rotated_square_is_close() {
        // Square of side 40 rotated by 30 degrees around (50, 50)
        let (s, c) = 30f64.to_radians().sin_cos();
        let mut matrix = BitMatrix::new(100, 100);
        for y in 0..100 {
            for x in 0..100 {
                let dx = x as f64 - 50.0;
                let dy = y as f64 - 50.0;
                let u = c * dx + s * dy;
                let v = -s * dx + c * dy;
                if u.abs() < 20.0 && v.abs() < 20.0 {
                    matrix.set(x, y, true);
                }
            }
        }
        let quad = fit_quad(&component_of(&matrix), 10.0).expect("quad");
        for (u, v) in [(-20.0, -20.0), (20.0, -20.0), (20.0, 20.0), (-20.0, 20.0)] {
            let e = Point::new(50.0 + c * u - s * v, 50.0 + s * u + c * v);
            let nearest = quad
                .corners
                .iter()
                .map(|q| q.distance(&e))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest < 1.0, "corner {e:?} off by {nearest}");
        }
    }

    #[test]
    fn small_and_round_shapes_are_rejected() {
        let mut matrix = BitMatrix::new(40, 40);
        for y in 10..16 {
            for x in 10..16 {
                matrix.set(x, y, true);
            }
        }
        assert!(fit_quad(&component_of(&matrix), 10.0).is_none());

        let mut disc = BitMatrix::new(80, 80);
        for y in 0..80 {
            for x in 0..80 {
                let r2 = (x as f64 - 40.0).powi(2) + (y as f64 - 40.0).powi(2);
                if r2 < 25.0 * 25.0 {
                    disc.set(x, y, true);
                }
            }
        }
        assert!(fit_quad(&component_of(&disc), 10.0).is_none());
    }

    #[test]
    fn shifted_rotates_corner_order() {
        let quad = Quad {
            corners: [
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
        };
        assert_eq!(quad.shifted(1)[0], Point::new(1.0, 0.0));
        assert_eq!(quad.shifted(3)[0], Point::new(0.0, 1.0));
        assert_eq!(quad.shifted(0), quad.corners);
    }
}

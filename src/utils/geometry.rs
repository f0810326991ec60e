/// Geometry utilities for planar homographies and quad measurements
use crate::models::Point;

/// Planar projective transform (3x3, row-major)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    h: [[f64; 3]; 3],
}

impl Homography {
    /// Wrap an explicit matrix
    pub fn from_rows(h: [[f64; 3]; 3]) -> Self {
        Self { h }
    }

    /// Identity transform
    pub fn identity() -> Self {
        Self::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Create transform from 4 source points to 4 destination points
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform with h33 fixed to 1
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for i in 0..4 {
            let (sx, sy) = (src[i].x, src[i].y);
            let (dx, dy) = (dst[i].x, dst[i].y);

            let row = i * 2;
            a[row] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[row] = dx;

            a[row + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[row + 1] = dy;
        }

        solve_linear_system(&a, &b).map(|s| {
            Self::from_rows([[s[0], s[1], s[2]], [s[3], s[4], s[5]], [s[6], s[7], 1.0]])
        })
    }

    /// Matrix element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.h[row][col]
    }

    /// Row-major copy of the nine coefficients
    pub fn to_row_major(&self) -> [f64; 9] {
        let h = &self.h;
        [
            h[0][0], h[0][1], h[0][2], h[1][0], h[1][1], h[1][2], h[2][0], h[2][1], h[2][2],
        ]
    }

    /// Transform a point using this perspective matrix
    pub fn project(&self, p: &Point) -> Point {
        let h = &self.h;
        let denominator = h[2][0] * p.x + h[2][1] * p.y + h[2][2];
        if denominator.abs() < 1e-12 {
            return Point::new(f64::NAN, f64::NAN);
        }

        Point::new(
            (h[0][0] * p.x + h[0][1] * p.y + h[0][2]) / denominator,
            (h[1][0] * p.x + h[1][1] * p.y + h[1][2]) / denominator,
        )
    }
}

/// Solve 8x8 linear system using Gaussian elimination with partial pivoting
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(a: &[[f64; 8]; 8], b: &[f64; 8]) -> Option<[f64; 8]> {
    let mut a = *a;
    let mut b = *b;
    let n = 8;

    // Forward elimination
    for i in 0..n {
        let mut max_val = a[i][i].abs();
        let mut max_row = i;

        for k in (i + 1)..n {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }

        // Singular
        if max_val < 1e-12 {
            return None;
        }

        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];

            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    // Back substitution
    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Some(x)
}

/// Twice the signed area of a polygon (shoelace); positive for clockwise
/// winding in image coordinates (y pointing down)
pub fn signed_area2(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = &points[i];
            let q = &points[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum()
}

/// Sum of side lengths of a closed polygon
pub fn perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n).map(|i| points[i].distance(&points[(i + 1) % n])).sum()
}

/// Infinite line `nx * x + ny * y = d` with unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Normal x component
    pub nx: f64,
    /// Normal y component
    pub ny: f64,
    /// Signed distance from the origin
    pub d: f64,
}

impl Line {
    /// Total least squares fit through `points`; `None` for fewer than two
    /// distinct points
    pub fn fit(points: &[Point]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mx = points.iter().map(|p| p.x).sum::<f64>() / n;
        let my = points.iter().map(|p| p.y).sum::<f64>() / n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for p in points {
            let dx = p.x - mx;
            let dy = p.y - my;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx + syy < 1e-12 {
            return None;
        }

        // Direction is the major eigenvector of the scatter matrix
        let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
        let (nx, ny) = (-theta.sin(), theta.cos());
        Some(Self {
            nx,
            ny,
            d: nx * mx + ny * my,
        })
    }

    /// Signed distance of `p` from the line
    pub fn distance(&self, p: &Point) -> f64 {
        self.nx * p.x + self.ny * p.y - self.d
    }

    /// Intersection point; `None` for (near) parallel lines
    pub fn intersect(&self, other: &Line) -> Option<Point> {
        let det = self.nx * other.ny - self.ny * other.nx;
        if det.abs() < 1e-9 {
            return None;
        }
        Some(Point::new(
            (self.d * other.ny - self.ny * other.d) / det,
            (self.nx * other.d - self.d * other.nx) / det,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, s: f64) -> [Point; 4] {
        [
            Point::new(x0, y0),
            Point::new(x0 + s, y0),
            Point::new(x0 + s, y0 + s),
            Point::new(x0, y0 + s),
        ]
    }

    #[test]
    fn test_homography_maps_corners() {
        let src = square(-1.0, -1.0, 2.0);
        let dst = [
            Point::new(10.0, 12.0),
            Point::new(52.0, 8.0),
            Point::new(60.0, 49.0),
            Point::new(14.0, 55.0),
        ];

        let h = Homography::from_points(&src, &dst).expect("non-degenerate");
        for (s, d) in src.iter().zip(dst.iter()) {
            let p = h.project(s);
            assert!(p.distance(d) < 1e-9, "{p:?} vs {d:?}");
        }
        assert_eq!(h.get(2, 2), 1.0);
    }

    #[test]
    fn test_homography_scale() {
        let h = Homography::from_points(&square(0.0, 0.0, 100.0), &square(0.0, 0.0, 50.0))
            .expect("non-degenerate");
        let p = h.project(&Point::new(50.0, 50.0));
        assert!((p.x - 25.0).abs() < 1e-9 && (p.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_points_rejected() {
        let p = Point::new(3.0, 3.0);
        assert!(Homography::from_points(&square(0.0, 0.0, 1.0), &[p; 4]).is_none());
    }

    #[test]
    fn test_row_major() {
        let h = Homography::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(h.to_row_major(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(Homography::identity().project(&Point::new(4.0, 5.0)), Point::new(4.0, 5.0));
    }

    #[test]
    fn test_winding_and_perimeter() {
        let sq = square(0.0, 0.0, 1.0);
        assert!(signed_area2(&sq) > 0.0);
        let mut rev = sq;
        rev.reverse();
        assert!(signed_area2(&rev) < 0.0);
        assert!((perimeter(&sq) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_line_fit_and_intersect() {
        let horizontal: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 2.0)).collect();
        let vertical: Vec<Point> = (0..10).map(|i| Point::new(5.0, i as f64)).collect();
        let h = Line::fit(&horizontal).expect("fit");
        let v = Line::fit(&vertical).expect("fit");
        assert!(h.distance(&Point::new(100.0, 2.0)).abs() < 1e-9);
        let x = h.intersect(&v).expect("not parallel");
        assert!(x.distance(&Point::new(5.0, 2.0)) < 1e-9);
        assert!(h.intersect(&h).is_none());
        assert!(Line::fit(&[Point::new(1.0, 1.0)]).is_none());
    }
}

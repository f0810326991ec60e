/// Connected components of dark pixels
/// Labels 8-connected dark regions and records the outer extents each tag
/// candidate needs for quad fitting
use crate::models::BitMatrix;

/// Union-Find data structure
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton sets labelled `0..n`
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root label of `x`
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression
        let mut node = x;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }
        root
    }

    /// Merge the sets holding `x` and `y`
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            // Keep the smaller label as root so roots follow raster order
            let (lo, hi) = if root_x < root_y {
                (root_x, root_y)
            } else {
                (root_y, root_x)
            };
            self.parent[hi as usize] = lo;
        }
    }
}

/// One 8-connected dark region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Leftmost column
    pub min_x: usize,
    /// Top row
    pub min_y: usize,
    /// Rightmost column
    pub max_x: usize,
    /// Bottom row
    pub max_y: usize,
    /// Dark pixels in the region
    pub pixel_count: usize,
    /// `(min_x, max_x)` for each row from `min_y` to `max_y`
    pub row_extents: Vec<(usize, usize)>,
    /// `(min_y, max_y)` for each column from `min_x` to `max_x`
    pub col_extents: Vec<(usize, usize)>,
}

impl Component {
    /// Bounding box width
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    /// Bounding box height
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// Whether any pixel lies on the outermost frame row/column
    pub fn touches_frame(&self, width: usize, height: usize) -> bool {
        self.min_x == 0 || self.min_y == 0 || self.max_x + 1 >= width || self.max_y + 1 >= height
    }
}

struct Stats {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    pixel_count: usize,
}

/// Label dark pixels and return components with at least `min_pixels`
/// pixels, ordered by their first pixel in raster order
pub fn find_dark_components(matrix: &BitMatrix, min_pixels: usize) -> Vec<Component> {
    let width = matrix.width();
    let height = matrix.height();

    let mut labels = vec![0u32; width * height];
    let mut next_label = 1u32;
    let mut uf = UnionFind::new(width * height + 1);

    // First pass: provisional labels, equivalences in the union-find
    for y in 0..height {
        for x in 0..width {
            if !matrix.get(x, y) {
                continue;
            }

            let mut neighbors = [0u32; 4];
            let mut count = 0;
            let mut push = |label: u32| {
                neighbors[count] = label;
                count += 1;
            };
            if x > 0 && matrix.get(x - 1, y) {
                push(labels[y * width + x - 1]);
            }
            if y > 0 {
                let above = (y - 1) * width;
                if x > 0 && matrix.get(x - 1, y - 1) {
                    push(labels[above + x - 1]);
                }
                if matrix.get(x, y - 1) {
                    push(labels[above + x]);
                }
                if x + 1 < width && matrix.get(x + 1, y - 1) {
                    push(labels[above + x + 1]);
                }
            }

            let idx = y * width + x;
            match neighbors[..count].iter().min() {
                None => {
                    labels[idx] = next_label;
                    next_label += 1;
                }
                Some(&min_label) => {
                    labels[idx] = min_label;
                    for &l in &neighbors[..count] {
                        if l != min_label {
                            uf.union(min_label, l);
                        }
                    }
                }
            }
        }
    }

    // Second pass: bounding boxes per root, in order of first appearance
    let mut slot_of_root: Vec<Option<usize>> = vec![None; next_label as usize];
    let mut stats: Vec<Stats> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let label = labels[y * width + x];
            if label == 0 {
                continue;
            }
            let root = uf.find(label);
            labels[y * width + x] = root;
            let slot = *slot_of_root[root as usize].get_or_insert_with(|| {
                stats.push(Stats {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                    pixel_count: 0,
                });
                stats.len() - 1
            });
            let s = &mut stats[slot];
            s.min_x = s.min_x.min(x);
            s.max_x = s.max_x.max(x);
            s.max_y = s.max_y.max(y);
            s.pixel_count += 1;
        }
    }

    // Keep big enough components; map slots to output indices
    let mut output_of_slot: Vec<Option<usize>> = vec![None; stats.len()];
    let mut components: Vec<Component> = Vec::new();
    for (slot, s) in stats.iter().enumerate() {
        if s.pixel_count < min_pixels {
            continue;
        }
        output_of_slot[slot] = Some(components.len());
        components.push(Component {
            min_x: s.min_x,
            min_y: s.min_y,
            max_x: s.max_x,
            max_y: s.max_y,
            pixel_count: s.pixel_count,
            row_extents: vec![(usize::MAX, 0); s.max_y - s.min_y + 1],
            col_extents: vec![(usize::MAX, 0); s.max_x - s.min_x + 1],
        });
    }
    if components.is_empty() {
        return components;
    }

    // Third pass: per-row and per-column extremes
    for y in 0..height {
        for x in 0..width {
            let root = labels[y * width + x];
            if root == 0 {
                continue;
            }
            let Some(slot) = slot_of_root[root as usize] else {
                continue;
            };
            let Some(out) = output_of_slot[slot] else {
                continue;
            };
            let c = &mut components[out];
            let row = &mut c.row_extents[y - c.min_y];
            row.0 = row.0.min(x);
            row.1 = row.1.max(x);
            let col = &mut c.col_extents[x - c.min_x];
            col.0 = col.0.min(y);
            col.1 = col.1.max(y);
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(matrix: &mut BitMatrix, x0: usize, y0: usize, x1: usize, y1: usize) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                matrix.set(x, y, true);
            }
        }
    }

    #[test]
    fn test_find_dark_components() {
        let mut matrix = BitMatrix::new(10, 10);
        fill(&mut matrix, 2, 2, 3, 3);

        let regions = find_dark_components(&matrix, 1);
        assert_eq!(regions.len(), 1);
        let c = &regions[0];
        assert_eq!((c.min_x, c.min_y, c.max_x, c.max_y), (2, 2, 3, 3));
        assert_eq!(c.pixel_count, 4);
        assert_eq!(c.row_extents, vec![(2, 3), (2, 3)]);
        assert!(!c.touches_frame(10, 10));
    }

    #[test]
    fn test_diagonal_neighbors_merge() {
        let mut matrix = BitMatrix::new(6, 6);
        matrix.set(1, 1, true);
        matrix.set(2, 2, true);
        matrix.set(3, 1, true);
        assert_eq!(find_dark_components(&matrix, 1).len(), 1);
    }

    #[test]
    fn test_u_shape_merges_late() {
        // Two arms joined only at the bottom row
        let mut matrix = BitMatrix::new(8, 8);
        fill(&mut matrix, 1, 1, 1, 5);
        fill(&mut matrix, 5, 1, 5, 5);
        fill(&mut matrix, 1, 5, 5, 5);
        let regions = find_dark_components(&matrix, 1);
        assert_eq!(regions.len(), 1);
        let c = &regions[0];
        assert_eq!(c.pixel_count, 13);
        assert_eq!(c.row_extents[0], (1, 5));
        assert_eq!(c.col_extents[2], (5, 5));
    }

    #[test]
    fn test_order_and_size_filter() {
        let mut matrix = BitMatrix::new(20, 20);
        fill(&mut matrix, 10, 1, 12, 3); // first in raster order
        fill(&mut matrix, 1, 5, 1, 5); // single pixel, filtered
        fill(&mut matrix, 2, 10, 6, 14);
        let regions = find_dark_components(&matrix, 4);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].min_x, 10);
        assert_eq!(regions[1].min_x, 2);
        assert_eq!(regions[1].width(), 5);
        assert_eq!(regions[1].height(), 5);
    }

    #[test]
    fn test_frame_contact() {
        let mut matrix = BitMatrix::new(5, 5);
        fill(&mut matrix, 0, 1, 2, 2);
        let regions = find_dark_components(&matrix, 1);
        assert!(regions[0].touches_frame(5, 5));
    }
}

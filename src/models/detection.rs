use serde::{Deserialize, Serialize};

use super::Point;
use crate::utils::geometry::Homography;

/// One recognized tag as produced by a detection engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Index of the codeword in the family table
    pub id: u32,
    /// Bit errors against the nearest codeword (0 = exact match)
    pub hamming_distance: u32,
    /// Engine verdict on whether the error is acceptable
    pub good: bool,
    /// Image of the tag centre
    pub center: Point,
    /// Images of the canonical corners `(-1,-1), (1,-1), (1,1), (-1,1)`, in that order
    pub corners: [Point; 4],
    /// Canonical tag frame to image
    pub homography: Homography,
}

/// Public per-tag record. Field names match what hosts receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    /// Index of the matched codeword
    pub id: u32,
    /// Bits corrected to reach the codeword
    pub hamming_distance: u32,
    /// Whether the correction stayed within the recovery budget
    pub good: bool,
    /// Image of the tag centre, `[x, y]`
    pub center: [f64; 2],
    /// Images of the canonical corners `(-1,-1), (1,-1), (1,1), (-1,1)`
    pub corners: [[f64; 2]; 4],
    /// Row-major 3x3 matrix
    pub homography: [f64; 9],
}

impl TagRecord {
    /// Map a point of the canonical tag frame into the image using `homography`.
    pub fn project(&self, x: f64, y: f64) -> [f64; 2] {
        let h = &self.homography;
        let w = h[6] * x + h[7] * y + h[8];
        [
            (h[0] * x + h[1] * y + h[2]) / w,
            (h[3] * x + h[4] * y + h[5]) / w,
        ]
    }
}

impl From<&RawDetection> for TagRecord {
    fn from(raw: &RawDetection) -> Self {
        Self {
            id: raw.id,
            hamming_distance: raw.hamming_distance,
            good: raw.good,
            center: raw.center.to_array(),
            corners: raw.corners.map(Point::to_array),
            homography: raw.homography.to_row_major(),
        }
    }
}

/// Records for one frame, in engine emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionResult(pub Vec<TagRecord>);

impl DetectionResult {
    /// Number of records
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no tag was recognized
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records in emission order
    pub fn iter(&self) -> std::slice::Iter<'_, TagRecord> {
        self.0.iter()
    }

    /// Ids in emission order.
    pub fn ids(&self) -> Vec<u32> {
        self.0.iter().map(|t| t.id).collect()
    }

    /// JSON array of records.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<Vec<TagRecord>> for DetectionResult {
    fn from(records: Vec<TagRecord>) -> Self {
        Self(records)
    }
}

impl IntoIterator for DetectionResult {
    type Item = TagRecord;
    type IntoIter = std::vec::IntoIter<TagRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DetectionResult {
    type Item = &'a TagRecord;
    type IntoIter = std::slice::Iter<'a, TagRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawDetection {
        RawDetection {
            id: 7,
            hamming_distance: 1,
            good: true,
            center: Point::new(10.0, 20.0),
            corners: [
                Point::new(1.0, 2.0),
                Point::new(3.0, 4.0),
                Point::new(5.0, 6.0),
                Point::new(7.0, 8.0),
            ],
            homography: Homography::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]),
        }
    }

    #[test]
    fn record_keeps_fields_and_flattens_row_major() {
        let record = TagRecord::from(&raw());
        assert_eq!(record.id, 7);
        assert_eq!(record.hamming_distance, 1);
        assert!(record.good);
        assert_eq!(record.center, [10.0, 20.0]);
        assert_eq!(record.corners, [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0]]);
        assert_eq!(
            record.homography,
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn json_uses_host_field_names() {
        let result = DetectionResult::from(vec![TagRecord::from(&raw())]);
        let value: serde_json::Value =
            serde_json::from_str(&result.to_json().expect("serialize")).expect("parse");
        let tag = &value[0];
        assert_eq!(tag["id"], 7);
        assert_eq!(tag["hammingDistance"], 1);
        assert_eq!(tag["good"], true);
        assert_eq!(tag["center"][1], 20.0);
        assert_eq!(tag["corners"].as_array().map(Vec::len), Some(4));
        assert_eq!(tag["homography"].as_array().map(Vec::len), Some(9));
        assert_eq!(tag["homography"][3], 4.0);
    }

    #[test]
    fn project_applies_flattened_matrix() {
        let mut record = TagRecord::from(&raw());
        record.homography = [2.0, 0.0, 5.0, 0.0, 3.0, -1.0, 0.0, 0.0, 1.0];
        assert_eq!(record.project(1.0, 1.0), [7.0, 2.0]);
    }
}

//! Shared helpers for integration tests

#![allow(dead_code)]

use apriltag_service::tools::{Canvas, axis_aligned_corners, rotated_corners};
use apriltag_service::{FamilyRegistry, Point, TagFamily, TagRecord};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn family(name: &str) -> &'static TagFamily {
    FamilyRegistry::builtin()
        .resolve(name)
        .expect("family compiled in")
}

/// One upright tag of `side` px with its top-left pixel at `(x0, y0)`
pub fn single_tag_frame(
    family_name: &str,
    id: u32,
    black_border: u32,
    x0: f64,
    y0: f64,
    side: f64,
) -> (Canvas, [Point; 4]) {
    let corners = axis_aligned_corners(x0, y0, side);
    let mut canvas = Canvas::new(200, 180, 255);
    canvas
        .draw_tag(family(family_name), id, black_border, &corners)
        .expect("render tag");
    (canvas, corners)
}

/// Three 36h11 tags on a light gray background
pub fn three_tag_scene() -> Canvas {
    let tag = family("36h11");
    let mut canvas = Canvas::new(320, 240, 200);
    canvas
        .draw_tag(tag, 0, 1, &axis_aligned_corners(20.0, 20.0, 64.0))
        .expect("tag 0");
    canvas
        .draw_tag(
            tag,
            17,
            1,
            &rotated_corners(Point::new(220.0, 70.0), 72.0, 0.4),
        )
        .expect("tag 17");
    canvas
        .draw_tag(
            tag,
            586,
            1,
            &[
                Point::new(60.0, 130.0),
                Point::new(160.0, 140.0),
                Point::new(150.0, 215.0),
                Point::new(55.0, 210.0),
            ],
        )
        .expect("tag 586");
    canvas
}

/// Green for dark cells, magenta for light ones.
///
/// BT.601 luma puts the two 46 levels apart while Rec.709 weights leave them
/// one level apart with the order flipped.
pub fn two_tone(value: u8) -> [u8; 3] {
    if value < 128 { [0, 200, 0] } else { [255, 98, 255] }
}

pub fn assert_corners_near(record: &TagRecord, expected: &[Point; 4], tolerance: f64) {
    for (i, (got, want)) in record.corners.iter().zip(expected).enumerate() {
        let d = Point::from(*got).distance(want);
        assert!(d < tolerance, "corner {i}: {got:?} vs {want:?} ({d:.3} px)");
    }
}

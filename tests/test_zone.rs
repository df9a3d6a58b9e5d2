//! Tests for `vidgest::zone` - dead zones, zone classification, and the
//! drag axis re-lock.

use vidgest::event::Point;
use vidgest::zone::{DirectionTracker, GestureZone, SurfaceSize, classify_zone};

/// Surface used for all tests: 1000x1000, default 5% margin.
const SURFACE: SurfaceSize = SurfaceSize {
    width: 1000.0,
    height: 1000.0,
};
const MARGIN: f64 = 5.0;

fn classify(x: f64, y: f64) -> GestureZone {
    classify_zone(Point::new(x, y), SURFACE, MARGIN)
}

// -- Zone classification ----------------------------------

#[test]
fn test_horizontal_top() {
    // Horizontally dominant offset from center, upper half.
    assert_eq!(classify(800.0, 300.0), GestureZone::HorizontalTop);
}

#[test]
fn test_horizontal_bottom() {
    assert_eq!(classify(800.0, 700.0), GestureZone::HorizontalBottom);
}

#[test]
fn test_vertical_left() {
    assert_eq!(classify(300.0, 750.0), GestureZone::VerticalLeft);
}

#[test]
fn test_vertical_right() {
    assert_eq!(classify(700.0, 750.0), GestureZone::VerticalRight);
}

#[test]
fn test_vertical_wins_axis_tie() {
    // Equal offsets: horizontal is only dominant when strictly larger.
    assert_eq!(classify(300.0, 300.0), GestureZone::VerticalLeft);
}

// -- Dead zones -------------------------------------------

#[test]
fn test_exact_center_is_dead() {
    assert_eq!(classify(500.0, 500.0), GestureZone::Unknown);
}

#[test]
fn test_edge_dead_zones() {
    assert_eq!(classify(10.0, 300.0), GestureZone::Unknown); // left
    assert_eq!(classify(990.0, 300.0), GestureZone::Unknown); // right
    assert_eq!(classify(300.0, 10.0), GestureZone::Unknown); // top
    assert_eq!(classify(300.0, 995.0), GestureZone::Unknown); // bottom
}

#[test]
fn test_center_vertical_band_is_dead() {
    assert_eq!(classify(480.0, 300.0), GestureZone::Unknown);
    assert_eq!(classify(524.0, 800.0), GestureZone::Unknown);
}

#[test]
fn test_center_horizontal_band_is_dead() {
    assert_eq!(classify(300.0, 480.0), GestureZone::Unknown);
    assert_eq!(classify(800.0, 524.0), GestureZone::Unknown);
}

#[test]
fn test_edge_band_boundary_is_live() {
    // The margin band is half-open: exactly 50 is outside the left band.
    assert_eq!(classify(50.0, 300.0), GestureZone::HorizontalTop);
}

#[test]
fn test_zero_margin_has_no_dead_zones() {
    let zone = classify_zone(Point::new(1.0, 1.0), SURFACE, 0.0);
    assert_eq!(zone, GestureZone::VerticalLeft);
}

// -- Degenerate surfaces ----------------------------------

#[test]
fn test_zero_surface_is_unknown() {
    let zone = classify_zone(Point::new(100.0, 100.0), SurfaceSize::new(0.0, 0.0), MARGIN);
    assert_eq!(zone, GestureZone::Unknown);
}

#[test]
fn test_zero_height_is_unknown() {
    let zone = classify_zone(Point::new(100.0, 0.0), SurfaceSize::new(1000.0, 0.0), MARGIN);
    assert_eq!(zone, GestureZone::Unknown);
}

#[test]
fn test_degenerate_surface_flag() {
    assert!(SurfaceSize::new(0.0, 100.0).is_degenerate());
    assert!(SurfaceSize::new(100.0, -1.0).is_degenerate());
    assert!(!SurfaceSize::new(100.0, 100.0).is_degenerate());
}

// -- Zone helpers -----------------------------------------

#[test]
fn test_axis_helpers() {
    assert!(GestureZone::HorizontalTop.is_horizontal());
    assert!(GestureZone::HorizontalBottom.is_horizontal());
    assert!(GestureZone::VerticalLeft.is_vertical());
    assert!(GestureZone::VerticalRight.is_vertical());
    assert!(!GestureZone::Unknown.is_horizontal());
    assert!(!GestureZone::Unknown.is_vertical());
}

#[test]
fn test_zone_display_names() {
    assert_eq!(GestureZone::HorizontalTop.to_string(), "horizontal_top");
    assert_eq!(GestureZone::VerticalRight.to_string(), "vertical_right");
    assert_eq!(GestureZone::Unknown.to_string(), "unknown");
}

// -- DirectionTracker -------------------------------------

fn tracker(zone: GestureZone, origin: (f64, f64)) -> DirectionTracker {
    DirectionTracker::new(zone, Point::new(origin.0, origin.1), SURFACE)
}

#[test]
fn test_unknown_never_reclassifies() {
    let mut t = tracker(GestureZone::Unknown, (800.0, 300.0));
    assert_eq!(t.update(Point::new(0.0, 100.0)), GestureZone::Unknown);
    assert_eq!(t.update(Point::new(100.0, 0.0)), GestureZone::Unknown);
}

#[test]
fn test_aligned_drag_keeps_zone() {
    let mut t = tracker(GestureZone::HorizontalTop, (800.0, 300.0));
    assert_eq!(t.update(Point::new(30.0, 5.0)), GestureZone::HorizontalTop);
    assert_eq!(t.update(Point::new(-30.0, 5.0)), GestureZone::HorizontalTop);
}

#[test]
fn test_relock_horizontal_to_vertical_right() {
    // Original touch in the right half: vertical movement re-locks right.
    let mut t = tracker(GestureZone::HorizontalTop, (800.0, 300.0));
    assert_eq!(t.update(Point::new(2.0, 30.0)), GestureZone::VerticalRight);
}

#[test]
fn test_relock_horizontal_to_vertical_left() {
    let mut t = tracker(GestureZone::HorizontalTop, (200.0, 350.0));
    assert_eq!(t.update(Point::new(2.0, 30.0)), GestureZone::VerticalLeft);
}

#[test]
fn test_relock_vertical_to_horizontal_top() {
    let mut t = tracker(GestureZone::VerticalRight, (700.0, 300.0));
    assert_eq!(t.update(Point::new(30.0, 2.0)), GestureZone::HorizontalTop);
}

#[test]
fn test_relock_vertical_to_horizontal_bottom() {
    let mut t = tracker(GestureZone::VerticalLeft, (300.0, 750.0));
    assert_eq!(t.update(Point::new(-30.0, 2.0)), GestureZone::HorizontalBottom);
}

#[test]
fn test_relock_can_flip_back() {
    let mut t = tracker(GestureZone::HorizontalTop, (800.0, 300.0));
    assert_eq!(t.update(Point::new(0.0, 30.0)), GestureZone::VerticalRight);
    // Deliberate horizontal movement flips the lock back.
    assert_eq!(t.update(Point::new(30.0, 0.0)), GestureZone::HorizontalTop);
}

#[test]
fn test_diagonal_tie_does_not_relock() {
    let mut t = tracker(GestureZone::HorizontalTop, (800.0, 300.0));
    assert_eq!(t.update(Point::new(30.0, 30.0)), GestureZone::HorizontalTop);
}

#[test]
fn test_zero_delta_keeps_zone() {
    let mut t = tracker(GestureZone::VerticalLeft, (300.0, 750.0));
    assert_eq!(t.update(Point::ZERO), GestureZone::VerticalLeft);
}

//! Tests for `vidgest::slop` - slop constants and the post-slop offset.

use vidgest::event::Point;
use vidgest::slop::{MOUSE_SLOP, PointerKind, SlopDetector, TOUCH_SLOP, pointer_slop};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_slop_constants() {
    assert!(approx(pointer_slop(PointerKind::Touch), TOUCH_SLOP));
    assert!(approx(pointer_slop(PointerKind::Mouse), MOUSE_SLOP));
    assert!(pointer_slop(PointerKind::Mouse) < pointer_slop(PointerKind::Touch));
}

#[test]
fn test_below_threshold_emits_nothing() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    assert_eq!(slop.feed(Point::new(5.0, 0.0)), None);
    assert_eq!(slop.feed(Point::new(5.0, 0.0)), None);
    assert_eq!(slop.feed(Point::new(0.0, 5.0)), None);
    assert!(!slop.crossed());
}

#[test]
fn test_crossing_emits_post_slop_offset() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    let post = slop.feed(Point::new(20.0, 0.0)).expect("slop crossed");
    assert!(approx(post.x, 2.0));
    assert!(approx(post.y, 0.0));
    assert!(slop.crossed());
}

#[test]
fn test_direction_preserved() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    let post = slop.feed(Point::new(0.0, -20.0)).expect("slop crossed");
    assert!(approx(post.x, 0.0));
    assert!(approx(post.y, -2.0));
}

#[test]
fn test_diagonal_post_slop_offset() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    // Magnitude 50; the 18-unit slop component is removed along the
    // displacement's own direction.
    let post = slop.feed(Point::new(30.0, 40.0)).expect("slop crossed");
    assert!(approx(post.x, 30.0 * (1.0 - 18.0 / 50.0)));
    assert!(approx(post.y, 40.0 * (1.0 - 18.0 / 50.0)));
}

#[test]
fn test_accumulates_across_samples() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    assert_eq!(slop.feed(Point::new(10.0, 0.0)), None);
    let post = slop.feed(Point::new(10.0, 0.0)).expect("slop crossed");
    assert!(approx(post.x, 2.0));
}

#[test]
fn test_exact_slop_distance_crosses() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    let post = slop.feed(Point::new(TOUCH_SLOP, 0.0)).expect("slop crossed");
    assert!(approx(post.x, 0.0));
    assert!(approx(post.y, 0.0));
}

#[test]
fn test_feed_after_crossing_returns_none() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    assert!(slop.feed(Point::new(25.0, 0.0)).is_some());
    assert_eq!(slop.feed(Point::new(25.0, 0.0)), None);
    assert!(slop.crossed());
}

#[test]
fn test_mouse_slop_crosses_earlier() {
    let mut slop = SlopDetector::new(PointerKind::Mouse);
    let post = slop.feed(Point::new(1.0, 0.0)).expect("mouse slop crossed");
    assert!(approx(post.x, 1.0 - MOUSE_SLOP));
}

#[test]
fn test_opposing_moves_cancel_out() {
    let mut slop = SlopDetector::new(PointerKind::Touch);
    assert_eq!(slop.feed(Point::new(15.0, 0.0)), None);
    assert_eq!(slop.feed(Point::new(-15.0, 0.0)), None);
    assert!(!slop.crossed());
}

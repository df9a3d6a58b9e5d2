//! Tests for `vidgest::tap` - single/double tap classification and the
//! double-tap window.

use std::time::{Duration, Instant};

use vidgest::event::{Point, TapChange};
use vidgest::tap::{DOUBLE_TAP_WINDOW, TapClassifier};
use vidgest::zone::SurfaceSize;

const SURFACE: SurfaceSize = SurfaceSize {
    width: 1000.0,
    height: 1000.0,
};

fn tap(classifier: &mut TapClassifier, x: f64, y: f64) -> Option<TapChange> {
    classifier.on_tap(Point::new(x, y), SURFACE, true)
}

/// Pretend the pending tap happened in the past.
fn backdate(classifier: &mut TapClassifier, by: Duration) {
    if let Some(pending) = classifier.pending.as_mut() {
        pending.at = Instant::now() - by;
    }
}

#[test]
fn test_first_tap_is_held_pending() {
    let mut c = TapClassifier::new();
    assert_eq!(tap(&mut c, 500.0, 300.0), None);
    assert!(c.has_pending_tap());
}

#[test]
fn test_pending_tap_does_not_expire_within_window() {
    let mut c = TapClassifier::new();
    tap(&mut c, 500.0, 300.0);
    assert_eq!(c.poll_expired(), None);
    assert!(c.has_pending_tap());
}

#[test]
fn test_expired_pending_tap_becomes_single_tap() {
    let mut c = TapClassifier::new();
    tap(&mut c, 400.0, 300.0);
    backdate(&mut c, Duration::from_millis(500));

    let result = c.poll_expired();
    assert_eq!(result, Some(TapChange::SingleTap(Point::new(400.0, 300.0))));
    assert!(!c.has_pending_tap());
}

#[test]
fn test_poll_without_pending_returns_none() {
    let mut c = TapClassifier::new();
    assert_eq!(c.poll_expired(), None);
}

#[test]
fn test_double_tap_left_half_is_backward() {
    let mut c = TapClassifier::new();
    assert_eq!(tap(&mut c, 100.0, 300.0), None);
    assert_eq!(
        tap(&mut c, 100.0, 300.0),
        Some(TapChange::BackwardTap(Point::new(100.0, 300.0)))
    );
}

#[test]
fn test_double_tap_right_half_is_forward() {
    let mut c = TapClassifier::new();
    assert_eq!(tap(&mut c, 900.0, 300.0), None);
    assert_eq!(
        tap(&mut c, 900.0, 300.0),
        Some(TapChange::ForwardTap(Point::new(900.0, 300.0)))
    );
}

#[test]
fn test_double_tap_disabled_reports_unknown() {
    let mut c = TapClassifier::new();
    assert_eq!(c.on_tap(Point::new(900.0, 300.0), SURFACE, false), None);
    assert_eq!(
        c.on_tap(Point::new(900.0, 300.0), SURFACE, false),
        Some(TapChange::Unknown)
    );
}

#[test]
fn test_double_tap_consumes_pending() {
    let mut c = TapClassifier::new();
    tap(&mut c, 100.0, 300.0);
    tap(&mut c, 100.0, 300.0);
    assert!(!c.has_pending_tap());
    assert_eq!(c.poll_expired(), None);
}

#[test]
fn test_distant_second_tap_is_not_a_double() {
    let mut c = TapClassifier::new();
    assert_eq!(tap(&mut c, 100.0, 100.0), None);
    // Second tap lands well outside the pairing distance: it becomes the
    // new pending tap instead.
    assert_eq!(tap(&mut c, 400.0, 400.0), None);
    assert!(c.has_pending_tap());
}

#[test]
fn test_slow_second_tap_is_not_a_double() {
    let mut c = TapClassifier::new();
    tap(&mut c, 600.0, 300.0);
    backdate(&mut c, DOUBLE_TAP_WINDOW + Duration::from_millis(100));
    assert_eq!(tap(&mut c, 600.0, 300.0), None);
    assert!(c.has_pending_tap());
}

#[test]
fn test_reset_clears_pending() {
    let mut c = TapClassifier::new();
    tap(&mut c, 500.0, 300.0);
    c.reset();
    assert!(!c.has_pending_tap());
}

#[test]
fn test_three_taps_pair_then_hold() {
    let mut c = TapClassifier::new();
    assert_eq!(tap(&mut c, 800.0, 300.0), None);
    assert!(matches!(
        tap(&mut c, 800.0, 300.0),
        Some(TapChange::ForwardTap(_))
    ));
    // The third tap starts a fresh pair.
    assert_eq!(tap(&mut c, 800.0, 300.0), None);
    assert!(c.has_pending_tap());
}

//! Touch-slop detection: how far a pointer must travel before a contact is
//! treated as a drag rather than a tap.

use crate::event::Point;

/// Default touch slop in device units (the stock Android value, 18dp).
pub const TOUCH_SLOP: f64 = 18.0;

/// Pointing devices are far more precise than fingers, so mice get a much
/// smaller slop (0.125dp on Android).
pub const MOUSE_SLOP: f64 = 0.125;

/// The physical source of a pointer contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Touch,
    Mouse,
}

/// Slop distance for a pointer source.
pub fn pointer_slop(kind: PointerKind) -> f64 {
    match kind {
        PointerKind::Touch => TOUCH_SLOP,
        PointerKind::Mouse => TOUCH_SLOP * (MOUSE_SLOP / TOUCH_SLOP),
    }
}

/// Accumulates per-sample displacement for one pointer until the cumulative
/// magnitude reaches the slop distance.
///
/// Nothing is reported below the threshold. The sample that crosses it
/// yields the *post-slop offset*: the accumulated displacement minus a
/// slop-length component along its own direction, so the drag starts from
/// zero rather than jumping by the slop distance.
#[derive(Debug, Clone)]
pub struct SlopDetector {
    slop: f64,
    total: Point,
    crossed: bool,
}

impl SlopDetector {
    pub fn new(kind: PointerKind) -> Self {
        SlopDetector {
            slop: pointer_slop(kind),
            total: Point::ZERO,
            crossed: false,
        }
    }

    /// Feed one movement delta. Returns the post-slop offset on the sample
    /// that crosses the threshold, `None` before (and after) the crossing.
    pub fn feed(&mut self, delta: Point) -> Option<Point> {
        if self.crossed {
            return None;
        }

        self.total += delta;
        let travelled = self.total.magnitude();
        if travelled < self.slop {
            return None;
        }

        self.crossed = true;
        if travelled == 0.0 {
            // Zero slop with a zero-length move; nothing to carry over.
            return Some(Point::ZERO);
        }
        Some(self.total - self.total * (self.slop / travelled))
    }

    pub fn crossed(&self) -> bool {
        self.crossed
    }

    /// Displacement accumulated so far, direction preserved.
    pub fn total(&self) -> Point {
        self.total
    }
}

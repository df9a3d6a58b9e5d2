//! Screen zones and drag axis tracking.
//!
//! A drag is classified once, where it starts: edge and center dead zones
//! yield no direction at all, everything else maps to one of four control
//! zones by which axis dominates the start point's offset from the surface
//! center. While the drag lives, the tracker may re-lock the zone to the
//! perpendicular axis when the finger's movement contradicts the initial
//! classification.

use strum::{Display, EnumString, IntoStaticStr};

use crate::event::Point;

/// Measured size of the interactive surface, in the same units as touch
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        SurfaceSize { width, height }
    }

    /// A surface with no area cannot classify anything.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// The directional category assigned to a drag from its start position.
///
/// `Unknown` means the drag started inside a dead zone and stays
/// directionless for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum GestureZone {
    #[strum(serialize = "horizontal_top")]
    HorizontalTop,
    #[strum(serialize = "horizontal_bottom")]
    HorizontalBottom,
    #[strum(serialize = "vertical_left")]
    VerticalLeft,
    #[strum(serialize = "vertical_right")]
    VerticalRight,
    #[strum(serialize = "unknown")]
    Unknown,
}

impl GestureZone {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, GestureZone::HorizontalTop | GestureZone::HorizontalBottom)
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, GestureZone::VerticalLeft | GestureZone::VerticalRight)
    }
}

/// Classify a gesture start position into its zone.
///
/// Six dead-zone bands are checked first: the four edge margins plus a
/// horizontal and a vertical band crossing the center, each sized
/// `margin_pct` percent of the relevant extent. A start inside any band is
/// `Unknown`. Otherwise the axis with the larger absolute offset from the
/// surface center wins, and the start's half picks the concrete zone.
///
/// This runs exactly once per gesture; the decision is never revisited for
/// past samples.
pub fn classify_zone(start: Point, surface: SurfaceSize, margin_pct: f64) -> GestureZone {
    if surface.is_degenerate() {
        return GestureZone::Unknown;
    }

    let margin = margin_pct / 100.0;
    let dead_zone_width = surface.width * margin;
    let dead_zone_height = surface.height * margin;

    let in_top = start.y < dead_zone_height;
    let in_bottom = start.y >= surface.height - dead_zone_height;
    let in_left = start.x < dead_zone_width;
    let in_right = start.x >= surface.width - dead_zone_width;

    // Center crosshair: a horizontal band (thickness height*margin) and a
    // vertical band (thickness width*margin), both centered.
    let center_h_start = (surface.height - dead_zone_height) / 2.0;
    let center_h_end = center_h_start + dead_zone_height;
    let in_center_horizontal = start.y >= center_h_start && start.y < center_h_end;

    let center_v_start = (surface.width - dead_zone_width) / 2.0;
    let center_v_end = center_v_start + dead_zone_width;
    let in_center_vertical = start.x >= center_v_start && start.x < center_v_end;

    if in_top || in_bottom || in_left || in_right || in_center_horizontal || in_center_vertical {
        return GestureZone::Unknown;
    }

    let delta_x = start.x - surface.width / 2.0;
    let delta_y = start.y - surface.height / 2.0;
    let horizontal_dominant = delta_x.abs() > delta_y.abs();

    if horizontal_dominant {
        if start.y < surface.height / 2.0 {
            GestureZone::HorizontalTop
        } else {
            GestureZone::HorizontalBottom
        }
    } else if start.x < surface.width / 2.0 {
        GestureZone::VerticalLeft
    } else {
        GestureZone::VerticalRight
    }
}

/// Maintains the locked axis of one drag across its lifetime.
///
/// An `Unknown` zone never re-classifies. A determined zone re-locks to the
/// perpendicular axis whenever a sample's movement is predominantly along
/// that other axis, choosing the concrete zone from which half of the
/// surface the *original* touch-down fell in. The rule keeps applying, so a
/// deliberate axis change can flip the lock back.
#[derive(Debug, Clone)]
pub struct DirectionTracker {
    zone: GestureZone,
    origin: Point,
    surface: SurfaceSize,
}

impl DirectionTracker {
    pub fn new(zone: GestureZone, origin: Point, surface: SurfaceSize) -> Self {
        DirectionTracker { zone, origin, surface }
    }

    pub fn current(&self) -> GestureZone {
        self.zone
    }

    /// Update the lock with one movement delta and return the zone in effect
    /// for this sample.
    pub fn update(&mut self, delta: Point) -> GestureZone {
        if self.zone == GestureZone::Unknown {
            return GestureZone::Unknown;
        }
        if delta.x == 0.0 && delta.y == 0.0 {
            return self.zone;
        }

        let drag_horizontal = delta.x.abs() > delta.y.abs();
        let drag_vertical = delta.y.abs() > delta.x.abs();

        if self.zone.is_horizontal() && drag_vertical {
            self.zone = if self.origin.x < self.surface.width / 2.0 {
                GestureZone::VerticalLeft
            } else {
                GestureZone::VerticalRight
            };
        } else if self.zone.is_vertical() && drag_horizontal {
            self.zone = if self.origin.y < self.surface.height / 2.0 {
                GestureZone::HorizontalTop
            } else {
                GestureZone::HorizontalBottom
            };
        }

        self.zone
    }
}

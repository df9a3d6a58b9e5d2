//! Single and double tap classification.
//!
//! A tap is a contact that lifts before slop is exceeded. The first tap is
//! held pending: a second tap landing close enough inside the double-tap
//! window becomes a double tap, split into backward/forward by which half of
//! the surface it hit; an expired pending tap is released as a single tap on
//! the next poll.

use std::time::{Duration, Instant};

use crate::event::{Point, TapChange};
use crate::zone::SurfaceSize;

/// Window within which a second tap counts as a double tap.
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// Maximum distance between two taps of a double tap, in device units.
pub const DOUBLE_TAP_DISTANCE: f64 = 50.0;

/// A tap waiting for its double-tap window to close.
#[derive(Debug, Clone, Copy)]
pub struct PendingTap {
    pub position: Point,
    pub at: Instant,
}

/// Classifies taps independently of the drag pipeline.
#[derive(Debug, Default)]
pub struct TapClassifier {
    /// Pending first tap - public for direct manipulation in tests.
    pub pending: Option<PendingTap>,
}

impl TapClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a completed tap at `position`.
    ///
    /// Returns the double-tap classification if this tap pairs with a
    /// pending one: disabled double tap yields `Unknown`, otherwise the left
    /// half of the surface is a backward tap and the right half a forward
    /// tap. A first tap returns `None` and waits.
    pub fn on_tap(
        &mut self,
        position: Point,
        surface: SurfaceSize,
        double_tap_enabled: bool,
    ) -> Option<TapChange> {
        let now = Instant::now();

        if let Some(first) = self.pending.take() {
            let paired = now.duration_since(first.at) < DOUBLE_TAP_WINDOW
                && first.position.distance_to(&position) < DOUBLE_TAP_DISTANCE;
            if paired {
                if !double_tap_enabled {
                    return Some(TapChange::Unknown);
                }
                return Some(if position.x < surface.width / 2.0 {
                    TapChange::BackwardTap(position)
                } else {
                    TapChange::ForwardTap(position)
                });
            }
        }

        self.pending = Some(PendingTap { position, at: now });
        None
    }

    pub fn has_pending_tap(&self) -> bool {
        self.pending.is_some()
    }

    /// If a tap is pending and its double-tap window has closed, consume it
    /// and return the single tap.
    pub fn poll_expired(&mut self) -> Option<TapChange> {
        let pending = self.pending.as_ref()?;
        if pending.at.elapsed() >= DOUBLE_TAP_WINDOW {
            let pending = self.pending.take()?;
            Some(TapChange::SingleTap(pending.position))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }
}

//! Gesture recognition engine: the dispatcher state machine, the exclusive
//! action slot, and the cooldown timer.
//!
//! One touch session runs Idle → awaiting slop → dragging. Crossing the
//! minimum-swipe threshold the first time only *arms* an action (claims the
//! slot without emitting), so the opening swipe cannot produce an oversized
//! value jump; every later crossing emits one discrete change and starts the
//! accumulator over. A 1-second cooldown after end/cancel keeps the slot
//! occupied so a different gesture kind cannot take over immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::debug;

use crate::config::GestureSettings;
use crate::event::{ControlEvent, DragChange, Point, PointerSample, StreamFrame, TapChange, ValueChange};
use crate::slop::{PointerKind, SlopDetector};
use crate::tap::TapClassifier;
use crate::zone::{DirectionTracker, GestureZone, SurfaceSize, classify_zone};

/// Delay before the active gesture action clears after a gesture ends.
pub const GESTURE_COOLDOWN: Duration = Duration::from_millis(1000);

/// The gesture kind currently owning pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureAction {
    Transform,
    HorizontalTop,
    HorizontalBottom,
    VerticalLeft,
    VerticalRight,
}

/// The single mutually exclusive action slot shared between the drag
/// dispatcher, the transform adapter, and the cooldown timer.
#[derive(Clone, Default)]
pub struct ActionSlot(Arc<Mutex<Option<GestureAction>>>);

impl ActionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<GestureAction> {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim the slot for `action` if it is free. Returns whether the claim
    /// succeeded; an occupied slot is left untouched.
    pub fn try_claim(&self, action: GestureAction) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            *slot = Some(action);
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Clear any single-finger action; a live transform keeps the slot.
    pub fn clear_unless_transform(&self) {
        let mut slot = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *slot != Some(GestureAction::Transform) {
            *slot = None;
        }
    }
}

/// Cancellable single-shot timer that clears the action slot after a fixed
/// delay.
///
/// Restarting bumps a generation counter; a sleeping timer compares its own
/// generation on wake and does nothing when it has been superseded
/// (last-writer-wins, never two live timers for one session).
pub struct CooldownTimer {
    generation: Arc<AtomicU64>,
    delay: Duration,
}

impl CooldownTimer {
    pub fn new(delay: Duration) -> Self {
        CooldownTimer {
            generation: Arc::new(AtomicU64::new(0)),
            delay,
        }
    }

    /// Cancel any pending clear and schedule a fresh one.
    pub fn restart(&self, slot: &ActionSlot) {
        let armed = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let slot = slot.clone();
        let delay = self.delay;

        thread::spawn(move || {
            thread::sleep(delay);
            if generation.load(Ordering::SeqCst) == armed {
                slot.clear();
            }
        });
    }

    /// Cancel a pending clear without scheduling a new one.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for CooldownTimer {
    fn default() -> Self {
        CooldownTimer::new(GESTURE_COOLDOWN)
    }
}

/// Which stage of one touch session the primary pointer is in.
#[derive(Debug)]
pub enum DragPhase {
    AwaitingSlop(SlopDetector),
    Dragging(DirectionTracker),
}

/// Per-session state, created on first finger down and dropped on last
/// finger up.
#[derive(Debug)]
pub struct DragSession {
    /// Settings snapshot; configure() changes apply to later sessions only.
    pub settings: GestureSettings,
    pub surface: SurfaceSize,
    /// Contact currently driving the drag. `None` after the driving contact
    /// lifted while others remain; the next moving contact adopts the role.
    pub primary: Option<i32>,
    pub phase: DragPhase,
    /// Accumulated swipe offset since the last threshold crossing.
    pub swipe: Point,
    pub max_touches: usize,
    /// A zero-sized surface cannot classify gestures; the session stays
    /// inert until the last finger lifts.
    pub inert: bool,
}

impl DragSession {
    /// Run one movement delta through the dispatcher.
    fn dispatch(
        &mut self,
        delta: Point,
        touch_count: usize,
        slot: &ActionSlot,
        consumed: &mut bool,
    ) -> Vec<ControlEvent> {
        let mut out = Vec::new();

        if touch_count >= 2 {
            // Two fingers suspend single-finger logic; a stale directional
            // action must not survive into the transform.
            slot.clear_unless_transform();
            return out;
        }

        let DragPhase::Dragging(tracker) = &mut self.phase else {
            return out;
        };

        self.swipe += delta;
        let zone = tracker.update(delta);

        let candidate = match zone {
            GestureZone::HorizontalTop if self.settings.horizontal_top_enabled => Some((
                GestureAction::HorizontalTop,
                self.swipe.x,
                self.settings.horizontal_top_min_swipe,
            )),
            GestureZone::HorizontalBottom if self.settings.horizontal_bottom_enabled => Some((
                GestureAction::HorizontalBottom,
                self.swipe.x,
                self.settings.horizontal_bottom_min_swipe,
            )),
            GestureZone::VerticalLeft if self.settings.vertical_left_enabled => Some((
                GestureAction::VerticalLeft,
                self.swipe.y,
                self.settings.vertical_left_min_swipe,
            )),
            GestureZone::VerticalRight if self.settings.vertical_right_enabled => Some((
                GestureAction::VerticalRight,
                self.swipe.y,
                self.settings.vertical_right_min_swipe,
            )),
            _ => None,
        };

        let Some((kind, along, min_swipe)) = candidate else {
            // Dead-zone start or disabled axis: no actionable gesture.
            out.push(ControlEvent::Drag(DragChange::Unknown));
            return out;
        };

        if along.abs() > min_swipe {
            match slot.current() {
                None => {
                    // First crossing arms the action; no value event yet.
                    slot.try_claim(kind);
                    *consumed = true;
                }
                Some(active) if active == kind => {
                    if let Some(change) = self.change_for(kind, delta) {
                        out.push(ControlEvent::Drag(change));
                    }
                    *consumed = true;
                }
                // Another kind owns the input; ignore this axis until the
                // slot clears.
                Some(_) => {}
            }
            self.swipe = Point::ZERO;
        }

        out
    }

    fn change_for(&self, kind: GestureAction, delta: Point) -> Option<DragChange> {
        match kind {
            GestureAction::HorizontalTop => Some(DragChange::HorizontalTop(self.swipe.x)),
            GestureAction::HorizontalBottom => Some(DragChange::HorizontalBottom(self.swipe.x)),
            GestureAction::VerticalLeft => Some(DragChange::VerticalLeft(
                ValueChange::from_vertical_delta(delta.y),
            )),
            GestureAction::VerticalRight => Some(DragChange::VerticalRight(
                ValueChange::from_vertical_delta(delta.y),
            )),
            GestureAction::Transform => None,
        }
    }
}

/// Recognizes video-control gestures from pointer samples.
pub struct GestureRecognizer {
    settings: GestureSettings,
    surface: SurfaceSize,

    /// Exclusive action slot - public so tests and embedders can observe it.
    pub slot: ActionSlot,
    /// Cooldown timer - public so tests can shorten the delay.
    pub cooldown: CooldownTimer,

    /// Session state - public for direct manipulation in tests.
    pub session: Option<DragSession>,
    pub taps: TapClassifier,

    touch_count: usize,
}

impl GestureRecognizer {
    pub fn new(settings: GestureSettings) -> Self {
        GestureRecognizer {
            settings,
            surface: SurfaceSize::default(),
            slot: ActionSlot::new(),
            cooldown: CooldownTimer::default(),
            session: None,
            taps: TapClassifier::new(),
            touch_count: 0,
        }
    }

    /// Replace thresholds and toggles. Takes effect for subsequent gesture
    /// sessions; an in-progress session keeps its snapshot.
    pub fn configure(&mut self, settings: GestureSettings) {
        self.settings = settings;
    }

    /// Update the measured surface size. Read at session start; an
    /// in-progress session keeps the size its zone was decided with.
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.surface = SurfaceSize::new(width, height);
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    pub fn touch_count(&self) -> usize {
        self.touch_count
    }

    /// Dispatch one assembled input frame.
    pub fn handle_frame(&mut self, frame: StreamFrame) -> Vec<ControlEvent> {
        match frame {
            StreamFrame::Down(sample) => self.touch_down(sample),
            StreamFrame::Move(mut sample) => self.touch_move(&mut sample),
            StreamFrame::Lift(sample) => self.touch_up(sample),
            StreamFrame::Transform { zoom, pan } => self.on_transform(zoom, pan),
        }
    }

    /// First contact opens a session with snapshots of the settings and the
    /// surface; later contacts only raise the touch count.
    pub fn touch_down(&mut self, sample: PointerSample) -> Vec<ControlEvent> {
        self.touch_count += 1;

        if self.touch_count == 1 {
            self.session = Some(DragSession {
                settings: self.settings.clone(),
                surface: self.surface,
                primary: Some(sample.id),
                phase: DragPhase::AwaitingSlop(SlopDetector::new(PointerKind::Touch)),
                swipe: Point::ZERO,
                max_touches: 1,
                inert: self.surface.is_degenerate(),
            });
        } else if let Some(session) = self.session.as_mut() {
            session.max_touches = session.max_touches.max(self.touch_count);
        }

        Vec::new()
    }

    /// Process one movement sample of the driving contact.
    pub fn touch_move(&mut self, sample: &mut PointerSample) -> Vec<ControlEvent> {
        let touch_count = self.touch_count;
        let slot = self.slot.clone();

        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.inert {
            return Vec::new();
        }

        let primary = *session.primary.get_or_insert(sample.id);
        if primary != sample.id {
            return Vec::new();
        }

        let delta = sample.delta();

        match &mut session.phase {
            DragPhase::AwaitingSlop(slop) => {
                let Some(post_slop) = slop.feed(delta) else {
                    return Vec::new();
                };
                sample.consumed = true;

                // The zone is decided once, where the drag actually starts.
                let start = sample.position;
                let zone = classify_zone(start, session.surface, session.settings.dead_zone_margin_pct);
                debug!("drag start at ({:.1}, {:.1}) zone {zone}", start.x, start.y);
                session.phase = DragPhase::Dragging(DirectionTracker::new(zone, start, session.surface));

                let mut out = vec![ControlEvent::Drag(DragChange::DragStart(start))];
                let mut consumed = sample.consumed;
                out.extend(session.dispatch(post_slop, touch_count, &slot, &mut consumed));
                sample.consumed = consumed;
                out
            }
            DragPhase::Dragging(_) => {
                let mut consumed = sample.consumed;
                let out = session.dispatch(delta, touch_count, &slot, &mut consumed);
                sample.consumed = consumed;
                out
            }
        }
    }

    /// A contact lifted. The session ends when the last one does: a drag
    /// emits `DragEnded` and starts the cooldown, a sub-slop single-contact
    /// session becomes a tap candidate.
    pub fn touch_up(&mut self, sample: PointerSample) -> Vec<ControlEvent> {
        let mut out = Vec::new();
        self.touch_count = self.touch_count.saturating_sub(1);

        if self.touch_count > 0 {
            if let Some(session) = self.session.as_mut() {
                if session.primary == Some(sample.id) {
                    session.primary = None;
                }
            }
            return out;
        }

        let Some(session) = self.session.take() else {
            return out;
        };

        match session.phase {
            DragPhase::AwaitingSlop(_) => {
                if session.max_touches == 1 && !session.inert {
                    if let Some(tap) = self.taps.on_tap(
                        sample.position,
                        session.surface,
                        session.settings.double_tap_enabled,
                    ) {
                        out.push(ControlEvent::Tap(tap));
                    }
                }
            }
            DragPhase::Dragging(_) => {
                out.push(ControlEvent::Drag(DragChange::DragEnded));
                self.cooldown.restart(&self.slot);
            }
        }
        out
    }

    /// The gesture was interrupted (device loss, system takeover). An
    /// in-flight drag reports `DragCanceled`; either way the cooldown takes
    /// care of the slot.
    pub fn cancel(&mut self) -> Vec<ControlEvent> {
        self.touch_count = 0;
        let Some(session) = self.session.take() else {
            return Vec::new();
        };

        match session.phase {
            DragPhase::Dragging(_) => {
                self.cooldown.restart(&self.slot);
                vec![ControlEvent::Drag(DragChange::DragCanceled)]
            }
            DragPhase::AwaitingSlop(_) => Vec::new(),
        }
    }

    /// Two-finger transform update from the sample stream (or an embedding
    /// framework's transform detector).
    ///
    /// The first update claims the slot, later ones emit and keep the
    /// cooldown alive; another active action kind mutes the stream until it
    /// clears. Disabled zoom reports the identity factor, disabled pan a
    /// zero vector.
    pub fn on_transform(&mut self, zoom: f64, pan: Point) -> Vec<ControlEvent> {
        if self.touch_count < 2 {
            // Below two fingers the already-running cooldown clears the
            // transform; nothing to process.
            return Vec::new();
        }

        let settings = self
            .session
            .as_ref()
            .map(|session| &session.settings)
            .unwrap_or(&self.settings);

        if !settings.zoom_enabled && !settings.pan_enabled {
            return Vec::new();
        }

        match self.slot.current() {
            None => {
                self.slot.try_claim(GestureAction::Transform);
                Vec::new()
            }
            Some(GestureAction::Transform) => {
                let zoom = if settings.zoom_enabled { zoom } else { 1.0 };
                let pan = if settings.pan_enabled { pan } else { Point::ZERO };
                self.cooldown.restart(&self.slot);
                vec![ControlEvent::Drag(DragChange::Transform { zoom, pan })]
            }
            Some(_) => Vec::new(),
        }
    }

    /// Release a pending single tap whose double-tap window has closed.
    pub fn poll_expired_tap(&mut self) -> Option<TapChange> {
        self.taps.poll_expired()
    }
}

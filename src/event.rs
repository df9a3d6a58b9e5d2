//! Control event vocabulary and touch event processing - no I/O, no
//! hardware, fully testable.
//!
//! This module contains the deterministic boundary of the gesture pipeline:
//! the geometry primitives, the control events delivered to consumers, the
//! intermediate touch-event representation decoupled from `evdev` types, the
//! sample assembler that turns buffered axis values into pointer samples, and
//! action resolution for the daemon.

use std::collections::HashMap;
use std::ops::{Add, AddAssign, Mul, Sub};

use strum::{Display, EnumString, IntoStaticStr};

use crate::config::ActionConfig;
use crate::recognizer::GestureRecognizer;

// -- Geometry -------------------------------------------------

/// A position or displacement in device units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// One pointer contact observed at one input frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Stable id for the duration of one physical contact.
    pub id: i32,
    pub position: Point,
    pub previous: Point,
    pub pressed: bool,
    /// Set by the recognizer when it claims the sample, so an embedding
    /// input layer can suppress its default scroll/click handling.
    pub consumed: bool,
}

impl PointerSample {
    pub fn delta(&self) -> Point {
        self.position - self.previous
    }
}

// -- Control events -------------------------------------------

/// The sign of a one-dimensional adjustment (brightness, volume, seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ValueChange {
    #[strum(serialize = "unknown")]
    Unknown,
    #[strum(serialize = "increased")]
    Increased,
    #[strum(serialize = "decreased")]
    Decreased,
}

impl ValueChange {
    /// Sign convention: the finger moving up (negative y delta) increases
    /// the value. Derived from the per-sample delta, not the accumulator.
    pub fn from_vertical_delta(dy: f64) -> Self {
        if dy > 0.0 {
            ValueChange::Decreased
        } else {
            ValueChange::Increased
        }
    }
}

/// Tap gestures delivered to the consumer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapChange {
    Unknown,
    SingleTap(Point),
    /// Double tap on the right half of the surface.
    ForwardTap(Point),
    /// Double tap on the left half of the surface.
    BackwardTap(Point),
}

/// Drag gestures delivered to the consumer.
///
/// The four directional variants carry discrete steps: one event per full
/// minimum-swipe crossing, never a continuous stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragChange {
    DragStart(Point),
    DragEnded,
    DragCanceled,
    /// Horizontal drag across the top band; payload is the accumulated x
    /// offset at the crossing (positive = rightward).
    HorizontalTop(f64),
    /// Horizontal drag across the bottom band.
    HorizontalBottom(f64),
    /// Vertical drag on the left half (brightness-like).
    VerticalLeft(ValueChange),
    /// Vertical drag on the right half (volume-like).
    VerticalRight(ValueChange),
    /// Two-finger pinch/pan. Zoom is a per-frame factor (1.0 = identity).
    Transform { zoom: f64, pan: Point },
    /// No actionable gesture: dead-zone start or disabled axis.
    Unknown,
}

/// Everything the recognizer emits, as one message channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Tap(TapChange),
    Drag(DragChange),
}

// -- Touch event IR -------------------------------------------

/// Intermediate representation of a relevant touch event,
/// decoupled from `evdev` types for testability.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    PositionX(f64),
    PositionY(f64),
    TrackingId(i32),
    FingerUp,
    SynReport,
}

/// Classify a single `evdev::InputEvent` into one of the touch-relevant
/// categories the pipeline cares about.  Returns `None` for irrelevant
/// events.
pub fn classify_event(event: &evdev::InputEvent) -> Option<TouchEvent> {
    use evdev::{AbsoluteAxisType, InputEventKind};

    match event.kind() {
        InputEventKind::AbsAxis(axis) => match axis {
            AbsoluteAxisType::ABS_MT_POSITION_X => {
                Some(TouchEvent::PositionX(event.value() as f64))
            }
            AbsoluteAxisType::ABS_MT_POSITION_Y => {
                Some(TouchEvent::PositionY(event.value() as f64))
            }
            AbsoluteAxisType::ABS_MT_TRACKING_ID => {
                if event.value() == -1 {
                    Some(TouchEvent::FingerUp)
                } else {
                    Some(TouchEvent::TrackingId(event.value()))
                }
            }
            _ => None,
        },
        InputEventKind::Synchronization(evdev::Synchronization::SYN_REPORT) => {
            Some(TouchEvent::SynReport)
        }
        _ => None,
    }
}

// -- Sample assembly ------------------------------------------

/// A complete input frame produced by [`SampleStream::flush`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamFrame {
    Down(PointerSample),
    Move(PointerSample),
    Lift(PointerSample),
    /// Derived two-finger update: per-frame zoom factor and centroid pan.
    Transform { zoom: f64, pan: Point },
}

/// Assembles buffered X/Y/tracking-id values into [`PointerSample`]s on
/// `SYN_REPORT`, tracking one position per live contact.
///
/// While exactly two contacts are down, consecutive frames are additionally
/// reduced to a zoom factor (ratio of inter-contact distances) and a pan
/// vector (centroid displacement), which feed the transform path of the
/// recognizer.
#[derive(Default)]
pub struct SampleStream {
    pending_x: Option<f64>,
    pending_y: Option<f64>,
    tracking_id: i32,
    lift_pending: bool,

    /// Last known position per live contact - public for tests.
    pub active: HashMap<i32, Point>,

    prev_pair: Option<(f64, Point)>,
}

impl SampleStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a pending X coordinate until `SYN_REPORT`.
    pub fn set_pending_x(&mut self, x: f64) {
        self.pending_x = Some(x);
    }

    /// Buffer a pending Y coordinate until `SYN_REPORT`.
    pub fn set_pending_y(&mut self, y: f64) {
        self.pending_y = Some(y);
    }

    /// Set the tracking id subsequent coordinates belong to.
    pub fn set_tracking_id(&mut self, id: i32) {
        self.tracking_id = id;
    }

    /// Record that the current contact lifted; resolved on the next flush.
    pub fn mark_lift(&mut self) {
        self.lift_pending = true;
    }

    pub fn touch_count(&self) -> usize {
        self.active.len()
    }

    /// Reset all buffered state, e.g. after a device disconnect.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Commit buffered values as complete frames on `SYN_REPORT`.
    pub fn flush(&mut self) -> Vec<StreamFrame> {
        let mut frames = Vec::new();

        if self.lift_pending {
            self.lift_pending = false;
            self.pending_x = None;
            self.pending_y = None;

            if let Some(position) = self.active.remove(&self.tracking_id) {
                frames.push(StreamFrame::Lift(PointerSample {
                    id: self.tracking_id,
                    position,
                    previous: position,
                    pressed: false,
                    consumed: false,
                }));
            }
            if self.active.len() < 2 {
                self.prev_pair = None;
            }
            return frames;
        }

        if self.pending_x.is_some() || self.pending_y.is_some() {
            let previous = self.active.get(&self.tracking_id).copied();
            let position = Point {
                x: self
                    .pending_x
                    .unwrap_or_else(|| previous.map_or(0.0, |p| p.x)),
                y: self
                    .pending_y
                    .unwrap_or_else(|| previous.map_or(0.0, |p| p.y)),
            };
            self.pending_x = None;
            self.pending_y = None;

            let sample = PointerSample {
                id: self.tracking_id,
                position,
                previous: previous.unwrap_or(position),
                pressed: true,
                consumed: false,
            };
            let is_down = previous.is_none();
            self.active.insert(self.tracking_id, position);
            frames.push(if is_down {
                StreamFrame::Down(sample)
            } else {
                StreamFrame::Move(sample)
            });
        }

        if self.active.len() == 2 {
            let mut contacts = self.active.values();
            let (a, b) = match (contacts.next(), contacts.next()) {
                (Some(a), Some(b)) => (*a, *b),
                _ => return frames,
            };
            let distance = a.distance_to(&b);
            let centroid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);

            if let Some((prev_distance, prev_centroid)) = self.prev_pair {
                let zoom = if prev_distance > 0.0 {
                    distance / prev_distance
                } else {
                    1.0
                };
                frames.push(StreamFrame::Transform {
                    zoom,
                    pan: centroid - prev_centroid,
                });
            }
            self.prev_pair = Some((distance, centroid));
        }

        frames
    }
}

// -- Core processing ------------------------------------------

/// Feed a sequence of [`TouchEvent`]s through the sample stream into a
/// recognizer and collect the control events that fire.  This is the **core
/// event-processing entry point** - pure, deterministic, and fully testable
/// without hardware.
pub fn process_touch_events(
    stream: &mut SampleStream,
    recognizer: &mut GestureRecognizer,
    events: &[TouchEvent],
) -> Vec<ControlEvent> {
    let mut out = Vec::new();
    for event in events {
        match event {
            TouchEvent::PositionX(x) => stream.set_pending_x(*x),
            TouchEvent::PositionY(y) => stream.set_pending_y(*y),
            TouchEvent::TrackingId(id) => stream.set_tracking_id(*id),
            TouchEvent::FingerUp => stream.mark_lift(),
            TouchEvent::SynReport => {
                for frame in stream.flush() {
                    out.extend(recognizer.handle_frame(frame));
                }
            }
        }
        if let Some(tap) = recognizer.poll_expired_tap() {
            out.push(ControlEvent::Tap(tap));
        }
    }
    out
}

// -- Action resolution ----------------------------------------

/// Config-facing names for the control events the daemon can bind shell
/// commands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ControlAction {
    #[strum(serialize = "seek_forward")]
    SeekForward,
    #[strum(serialize = "seek_backward")]
    SeekBackward,
    #[strum(serialize = "scrub_forward")]
    ScrubForward,
    #[strum(serialize = "scrub_backward")]
    ScrubBackward,
    #[strum(serialize = "brightness_up")]
    BrightnessUp,
    #[strum(serialize = "brightness_down")]
    BrightnessDown,
    #[strum(serialize = "volume_up")]
    VolumeUp,
    #[strum(serialize = "volume_down")]
    VolumeDown,
    #[strum(serialize = "single_tap")]
    SingleTap,
    #[strum(serialize = "forward_tap")]
    ForwardTap,
    #[strum(serialize = "backward_tap")]
    BackwardTap,
}

/// Map a control event to its config-facing action name.
///
/// Transform changes, lifecycle events, and Unknown have no bindable action.
pub fn control_action_for(event: &ControlEvent) -> Option<ControlAction> {
    match event {
        ControlEvent::Tap(TapChange::SingleTap(_)) => Some(ControlAction::SingleTap),
        ControlEvent::Tap(TapChange::ForwardTap(_)) => Some(ControlAction::ForwardTap),
        ControlEvent::Tap(TapChange::BackwardTap(_)) => Some(ControlAction::BackwardTap),
        ControlEvent::Tap(TapChange::Unknown) => None,
        ControlEvent::Drag(DragChange::HorizontalTop(dx)) => Some(if *dx > 0.0 {
            ControlAction::SeekForward
        } else {
            ControlAction::SeekBackward
        }),
        ControlEvent::Drag(DragChange::HorizontalBottom(dx)) => Some(if *dx > 0.0 {
            ControlAction::ScrubForward
        } else {
            ControlAction::ScrubBackward
        }),
        ControlEvent::Drag(DragChange::VerticalLeft(change)) => match change {
            ValueChange::Increased => Some(ControlAction::BrightnessUp),
            ValueChange::Decreased => Some(ControlAction::BrightnessDown),
            ValueChange::Unknown => None,
        },
        ControlEvent::Drag(DragChange::VerticalRight(change)) => match change {
            ValueChange::Increased => Some(ControlAction::VolumeUp),
            ValueChange::Decreased => Some(ControlAction::VolumeDown),
            ValueChange::Unknown => None,
        },
        ControlEvent::Drag(_) => None,
    }
}

/// Look up the shell command bound to a control action in the surface config.
///
/// Returns `Some(command)` if the action is configured, enabled, and has a
/// command.
pub fn resolve_action(
    action: ControlAction,
    actions: &HashMap<String, ActionConfig>,
) -> Option<&str> {
    let action_name: &str = action.into();
    actions
        .get(action_name)
        .filter(|ac| ac.enabled)
        .and_then(|ac| ac.command.as_deref())
}

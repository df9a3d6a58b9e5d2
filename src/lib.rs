//! vidgest – video-control gesture recognition for Linux touchscreens.
//!
//! Raw pointer samples flow through a small pipeline: a slop detector decides
//! when a touch becomes a drag, a zone classifier decides (once, at drag
//! start) which control the drag addresses, a direction tracker keeps the
//! drag locked to an axis, and the recognizer turns accumulated swipe
//! distance into discrete control events while enforcing that only one
//! gesture kind owns the input at a time.
//!
//! The deterministic core ([`event`], [`slop`], [`zone`], [`tap`],
//! [`recognizer`]) is hardware-free. Device discovery and the blocking evdev
//! loops live in [`manager`]; the page bitmap cache consumed by paged
//! document surfaces lives in [`pager`].

pub mod config;
pub mod event;
pub mod manager;
pub mod pager;
pub mod recognizer;
pub mod slop;
pub mod tap;
pub mod zone;

#![forbid(unsafe_code)]

//! Visibility event values delivered to user callbacks.
//!
//! Events are produced fresh per dispatch from a host intersection record and
//! never retained by the engine; the only copy alive after dispatch is the one
//! the callback received.

use core::fmt;

/// Axis-aligned rectangle in host coordinates.
///
/// The engine never computes with these; they are carried verbatim from the
/// host record to the event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from origin and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The two kinds of visibility transition a callback can register for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The target became (partially) visible: intersection ratio > 0.
    Enter,
    /// The target left the viewport entirely: intersection ratio == 0.
    Exit,
}

impl EventKind {
    /// Classify an intersection ratio. A ratio above zero is an enter, a
    /// ratio of exactly zero is an exit; no ratio is ever both.
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.0 { Self::Enter } else { Self::Exit }
    }

    /// Wire name of the kind (`"enter"` / `"exit"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visibility transition for one target, handed to user callbacks.
#[derive(Clone, Debug)]
pub struct VisibilityEvent<E> {
    /// Which transition fired.
    pub kind: EventKind,
    /// Visible share of the target's area, 0–100.
    pub percentage: f64,
    /// Bounds of the intersection root, when the host reports them.
    pub root_bounds: Option<Rect>,
    /// The target's own bounds at record time.
    pub bounding_client_rect: Rect,
    /// The visible portion of the target.
    pub intersection_rect: Rect,
    /// The element this event is about.
    pub target: E,
    /// Host timestamp of the underlying record, in milliseconds.
    pub time_ms: f64,
}

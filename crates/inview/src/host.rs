#![forbid(unsafe_code)]

//! Host abstraction: the two external capabilities the engine requires.
//!
//! The engine does no geometry of its own. It needs a host that can
//! (a) asynchronously deliver intersection-ratio records for observed
//! elements, given a threshold sequence, and (b) schedule and cancel
//! single-shot timers. Both live on the [`ViewportHost`] trait, together with
//! selector resolution and a stable per-element identity used to key the
//! debounce ledger without keeping elements alive.
//!
//! A host without the observation primitive signals it through
//! [`HostError::Unsupported`]; the engine degrades to an inert session with a
//! diagnostic instead of failing construction.

use std::time::Duration;

use crate::event::{EventKind, Rect, VisibilityEvent};

/// Stable identity of a host element.
///
/// Used as the debounce ledger key so the ledger never owns (or keeps alive)
/// the element itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl core::fmt::Display for ElementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One intersection sample delivered by the host observer.
#[derive(Clone, Debug)]
pub struct IntersectionRecord<E> {
    /// Visible fraction of the target's area, in [0, 1].
    pub ratio: f64,
    /// Bounds of the intersection root, when the host reports them.
    pub root_bounds: Option<Rect>,
    /// The target's own bounds at record time.
    pub bounding_client_rect: Rect,
    /// The visible portion of the target.
    pub intersection_rect: Rect,
    /// The element the sample is about.
    pub target: E,
    /// Host timestamp, in milliseconds.
    pub time_ms: f64,
}

impl<E: Clone> IntersectionRecord<E> {
    /// Build the user-facing event for this record under `kind`.
    #[must_use]
    pub fn to_event(&self, kind: EventKind) -> VisibilityEvent<E> {
        VisibilityEvent {
            kind,
            percentage: self.ratio * 100.0,
            root_bounds: self.root_bounds,
            bounding_client_rect: self.bounding_client_rect,
            intersection_rect: self.intersection_rect,
            target: self.target.clone(),
            time_ms: self.time_ms,
        }
    }
}

/// Callback invoked by the host with each delivered batch of records.
///
/// Records within one batch are processed in delivery order.
pub type BatchCallback<E> = Box<dyn FnMut(&[IntersectionRecord<E>])>;

/// Failure to obtain a host capability.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HostError {
    /// The host does not provide an intersection-observation primitive.
    #[error("host does not support intersection observation")]
    Unsupported,
}

/// A live host observation handle.
///
/// Created with a fixed threshold sequence; elements are attached one at a
/// time. After [`disconnect`](Self::disconnect) no further batches are
/// delivered for this handle.
pub trait IntersectionObserver<E> {
    /// Begin observing one element.
    fn observe(&self, target: &E);

    /// Stop observing everything and drop the host-side registration.
    fn disconnect(&self);
}

/// The host environment the engine runs against.
///
/// Implementations wrap whatever the platform provides: a DOM
/// `IntersectionObserver` plus `setTimeout`, or the simulated host in
/// [`sim`](crate::sim) for tests.
pub trait ViewportHost {
    /// Element handle. Cheap to clone; identity comes from
    /// [`element_id`](Self::element_id), not from the handle itself.
    type Element: Clone + 'static;
    /// Observation handle type.
    type Observer: IntersectionObserver<Self::Element>;
    /// Pending-timer handle type.
    type Timer;

    /// Stable identity for `element`, constant for the element's lifetime.
    fn element_id(element: &Self::Element) -> ElementId;

    /// All elements matching `selector`, in host order.
    fn query(&self, selector: &str) -> Vec<Self::Element>;

    /// The first element matching `selector`, if any.
    fn query_first(&self, selector: &str) -> Option<Self::Element>;

    /// Create an observation handle over `thresholds`.
    ///
    /// The host invokes `on_batch` asynchronously with each batch of records
    /// for elements later attached via
    /// [`IntersectionObserver::observe`].
    fn create_observer(
        &self,
        thresholds: &[f64],
        on_batch: BatchCallback<Self::Element>,
    ) -> Result<Self::Observer, HostError>;

    /// Schedule `callback` to run once after `delay`.
    fn start_timer(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Timer;

    /// Cancel a pending timer. Cancelling an already-fired timer is a no-op.
    fn cancel_timer(&self, timer: Self::Timer);
}

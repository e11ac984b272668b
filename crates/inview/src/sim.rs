#![forbid(unsafe_code)]

//! Simulated host for tests and demos.
//!
//! [`SimHost`] implements [`ViewportHost`] with no real geometry: elements are
//! registered by selector, intersection records are delivered by hand
//! ([`deliver`](SimHost::deliver) / [`deliver_batch`](SimHost::deliver_batch)),
//! and time is a manual millisecond clock whose [`advance`](SimHost::advance)
//! fires due timers in deadline order. [`SimHost::without_observation`] builds
//! a host that lacks the observation primitive, for degraded-mode tests.
//!
//! Cloning a `SimHost` shares the underlying world, so a test can keep a
//! handle for clock control while the engine owns its own.
//!
//! # Invariants
//!
//! 1. `advance(ms)` fires every timer with a deadline inside the window, in
//!    deadline order (ties in creation order), setting the clock to each
//!    deadline before its callback runs and to the window end afterwards.
//! 2. Records reach only connected observers that observe the record's
//!    target.
//! 3. A disconnected observer never receives another batch.

use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::event::Rect;
use crate::host::{
    BatchCallback, ElementId, HostError, IntersectionObserver, IntersectionRecord, ViewportHost,
};

/// Handle to a simulated element. Clones share identity.
#[derive(Clone)]
pub struct SimElement {
    node: Rc<ElementNode>,
}

struct ElementNode {
    id: u64,
    selector: String,
}

impl SimElement {
    /// Stable identity of this element.
    #[must_use]
    pub fn id(&self) -> ElementId {
        ElementId(self.node.id)
    }

    /// The selector this element was registered under.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.node.selector
    }
}

impl PartialEq for SimElement {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for SimElement {}

impl fmt::Debug for SimElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimElement")
            .field("id", &self.node.id)
            .field("selector", &self.node.selector)
            .finish()
    }
}

struct TimerEntry {
    id: u64,
    deadline_ms: f64,
    callback: Box<dyn FnOnce()>,
}

struct ObserverState {
    thresholds: Vec<f64>,
    connected: Cell<bool>,
    observed: RefCell<Vec<SimElement>>,
    on_batch: RefCell<BatchCallback<SimElement>>,
}

/// Observation handle produced by [`SimHost::create_observer`].
pub struct SimObserver {
    state: Rc<ObserverState>,
}

impl SimObserver {
    /// The threshold sequence this observer was created with.
    #[must_use]
    pub fn thresholds(&self) -> &[f64] {
        &self.state.thresholds
    }
}

impl IntersectionObserver<SimElement> for SimObserver {
    fn observe(&self, target: &SimElement) {
        if self.state.connected.get() {
            self.state.observed.borrow_mut().push(target.clone());
        }
    }

    fn disconnect(&self) {
        self.state.connected.set(false);
        self.state.observed.borrow_mut().clear();
    }
}

struct HostState {
    now_ms: Cell<f64>,
    next_element_id: Cell<u64>,
    next_timer_id: Cell<u64>,
    elements: RefCell<Vec<SimElement>>,
    timers: RefCell<Vec<TimerEntry>>,
    observers: RefCell<Vec<Weak<ObserverState>>>,
    observation_supported: bool,
}

/// Scripted host world: elements, observers, and a manual clock.
#[derive(Clone)]
pub struct SimHost {
    state: Rc<HostState>,
}

impl SimHost {
    /// A host with the observation primitive available.
    #[must_use]
    pub fn new() -> Self {
        Self::with_support(true)
    }

    /// A host lacking the observation primitive: every
    /// [`create_observer`](ViewportHost::create_observer) call fails with
    /// [`HostError::Unsupported`].
    #[must_use]
    pub fn without_observation() -> Self {
        Self::with_support(false)
    }

    fn with_support(observation_supported: bool) -> Self {
        Self {
            state: Rc::new(HostState {
                now_ms: Cell::new(0.0),
                next_element_id: Cell::new(1),
                next_timer_id: Cell::new(1),
                elements: RefCell::new(Vec::new()),
                timers: RefCell::new(Vec::new()),
                observers: RefCell::new(Vec::new()),
                observation_supported,
            }),
        }
    }

    /// Register an element under `selector` and return its handle.
    pub fn add_element(&self, selector: &str) -> SimElement {
        let id = self.state.next_element_id.get();
        self.state.next_element_id.set(id + 1);
        let element = SimElement {
            node: Rc::new(ElementNode {
                id,
                selector: selector.to_owned(),
            }),
        };
        self.state.elements.borrow_mut().push(element.clone());
        element
    }

    /// Current clock reading, in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.state.now_ms.get()
    }

    /// Timers scheduled but not yet fired or cancelled.
    #[must_use]
    pub fn pending_timer_count(&self) -> usize {
        self.state.timers.borrow().len()
    }

    /// Live, connected observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.state
            .observers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|observer| observer.connected.get())
            .count()
    }

    /// Move the clock forward by `ms`, firing due timers in deadline order.
    ///
    /// A callback may schedule further timers; any that land inside the same
    /// window fire too.
    pub fn advance(&self, ms: f64) {
        let window_end = self.state.now_ms.get() + ms;
        loop {
            let due = {
                let timers = self.state.timers.borrow();
                timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.deadline_ms <= window_end)
                    .min_by(|(_, a), (_, b)| {
                        a.deadline_ms.total_cmp(&b.deadline_ms).then(a.id.cmp(&b.id))
                    })
                    .map(|(index, _)| index)
            };
            let Some(index) = due else { break };
            let entry = self.state.timers.borrow_mut().remove(index);
            self.state.now_ms.set(entry.deadline_ms);
            (entry.callback)();
        }
        self.state.now_ms.set(window_end);
    }

    /// Deliver a single-record batch for `target` to every connected observer
    /// observing it.
    pub fn deliver(&self, target: &SimElement, ratio: f64) {
        self.deliver_batch(std::slice::from_ref(&(target.clone(), ratio)));
    }

    /// Deliver one batch per observer, containing that observer's observed
    /// subset of `updates`, in update order.
    pub fn deliver_batch(&self, updates: &[(SimElement, f64)]) {
        let recipients: Vec<Rc<ObserverState>> = self
            .state
            .observers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|observer| observer.connected.get())
            .collect();

        for observer in recipients {
            let records: Vec<IntersectionRecord<SimElement>> = updates
                .iter()
                .filter(|(target, _)| {
                    observer
                        .observed
                        .borrow()
                        .iter()
                        .any(|observed| observed.id() == target.id())
                })
                .map(|(target, ratio)| self.record(target, *ratio))
                .collect();
            if records.is_empty() {
                continue;
            }
            // Disconnected mid-batch by an earlier recipient's callback.
            if !observer.connected.get() {
                continue;
            }
            let mut on_batch = observer.on_batch.borrow_mut();
            (&mut *on_batch)(&records);
        }
    }

    fn record(&self, target: &SimElement, ratio: f64) -> IntersectionRecord<SimElement> {
        // Fixed 100x100 target box; the visible strip grows with the ratio.
        IntersectionRecord {
            ratio,
            root_bounds: Some(Rect::new(0.0, 0.0, 800.0, 600.0)),
            bounding_client_rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            intersection_rect: Rect::new(0.0, 0.0, 100.0, ratio * 100.0),
            target: target.clone(),
            time_ms: self.state.now_ms.get(),
        }
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportHost for SimHost {
    type Element = SimElement;
    type Observer = SimObserver;
    type Timer = u64;

    fn element_id(element: &SimElement) -> ElementId {
        element.id()
    }

    fn query(&self, selector: &str) -> Vec<SimElement> {
        self.state
            .elements
            .borrow()
            .iter()
            .filter(|element| element.selector() == selector)
            .cloned()
            .collect()
    }

    fn query_first(&self, selector: &str) -> Option<SimElement> {
        self.query(selector).into_iter().next()
    }

    fn create_observer(
        &self,
        thresholds: &[f64],
        on_batch: BatchCallback<SimElement>,
    ) -> Result<SimObserver, HostError> {
        if !self.state.observation_supported {
            return Err(HostError::Unsupported);
        }
        let state = Rc::new(ObserverState {
            thresholds: thresholds.to_vec(),
            connected: Cell::new(true),
            observed: RefCell::new(Vec::new()),
            on_batch: RefCell::new(on_batch),
        });
        self.state.observers.borrow_mut().push(Rc::downgrade(&state));
        Ok(SimObserver { state })
    }

    fn start_timer(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> u64 {
        let id = self.state.next_timer_id.get();
        self.state.next_timer_id.set(id + 1);
        let deadline_ms = self.state.now_ms.get() + delay.as_secs_f64() * 1000.0;
        self.state.timers.borrow_mut().push(TimerEntry {
            id,
            deadline_ms,
            callback,
        });
        id
    }

    fn cancel_timer(&self, timer: u64) {
        self.state.timers.borrow_mut().retain(|entry| entry.id != timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_filters_by_selector() {
        let host = SimHost::new();
        host.add_element(".card");
        host.add_element("#hero");
        host.add_element(".card");
        assert_eq!(host.query(".card").len(), 2);
        assert_eq!(host.query("#hero").len(), 1);
        assert!(host.query(".missing").is_empty());
        assert_eq!(
            host.query_first(".card").map(|e| e.id()),
            Some(ElementId(1))
        );
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let host = SimHost::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        host.start_timer(Duration::from_millis(50), Box::new(move || o.borrow_mut().push("late")));
        let o = Rc::clone(&order);
        host.start_timer(Duration::from_millis(10), Box::new(move || o.borrow_mut().push("early")));

        host.advance(100.0);
        assert_eq!(*order.borrow(), vec!["early", "late"]);
        assert_eq!(host.now_ms(), 100.0);
    }

    #[test]
    fn clock_reads_deadline_inside_callback() {
        let host = SimHost::new();
        let seen = Rc::new(Cell::new(0.0));
        let s = Rc::clone(&seen);
        let h = host.clone();
        host.start_timer(Duration::from_millis(30), Box::new(move || s.set(h.now_ms())));
        host.advance(100.0);
        assert_eq!(seen.get(), 30.0);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let host = SimHost::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let id = host.start_timer(Duration::from_millis(10), Box::new(move || f.set(true)));
        host.cancel_timer(id);
        host.advance(100.0);
        assert!(!fired.get());
        assert_eq!(host.pending_timer_count(), 0);
    }

    #[test]
    fn delivery_reaches_only_observers_of_the_target() {
        let host = SimHost::new();
        let a = host.add_element("#a");
        let b = host.add_element("#b");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let observer = host
            .create_observer(&[0.0, 1.0], Box::new(move |records| {
                for record in records {
                    s.borrow_mut().push(record.target.id());
                }
            }))
            .unwrap();
        observer.observe(&a);

        host.deliver(&a, 0.5);
        host.deliver(&b, 0.5);
        assert_eq!(*seen.borrow(), vec![a.id()]);
    }

    #[test]
    fn disconnect_stops_delivery() {
        let host = SimHost::new();
        let a = host.add_element("#a");
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let observer = host
            .create_observer(&[0.0, 1.0], Box::new(move |records| {
                c.set(c.get() + u32::try_from(records.len()).unwrap_or(u32::MAX));
            }))
            .unwrap();
        observer.observe(&a);

        host.deliver(&a, 0.5);
        observer.disconnect();
        host.deliver(&a, 0.9);
        assert_eq!(count.get(), 1);
        assert_eq!(host.observer_count(), 0);
    }

    #[test]
    fn observer_keeps_its_threshold_sequence() {
        let host = SimHost::new();
        let observer = host
            .create_observer(&[0.0, 0.5, 1.0], Box::new(|_| {}))
            .unwrap();
        assert_eq!(observer.thresholds(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn unsupported_host_refuses_observers() {
        let host = SimHost::without_observation();
        let result = host.create_observer(&[0.0], Box::new(|_| {}));
        assert!(matches!(result, Err(HostError::Unsupported)));
    }
}

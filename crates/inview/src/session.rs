#![forbid(unsafe_code)]

//! One observation session: a host observer bound to a threshold table and a
//! target set, translating raw intersection records into visibility events.
//!
//! A session is created per [`InView::on`](crate::InView::on) call and only
//! ever torn down en masse by [`InView::destroy`](crate::InView::destroy) (or
//! by dropping the facade — the session disconnects its host observer on
//! drop).
//!
//! # Invariants
//!
//! 1. Records in one delivered batch are processed in delivery order.
//! 2. A record forwards at most one event, and only for the kind this session
//!    was registered with.
//! 3. The paused flag is read per record, at dispatch time: toggling pause in
//!    the middle of a batch affects only still-unprocessed records.
//! 4. After [`stop`](Session::stop), no further events are forwarded.

use std::cell::Cell;
use std::rc::Rc;

use crate::event::{EventKind, VisibilityEvent};
use crate::host::{IntersectionObserver, IntersectionRecord, ViewportHost};

/// A live (or inert) observation session.
///
/// Inert sessions — no targets, or a host without the observation primitive —
/// hold no observer and forward nothing; creating one logs a diagnostic but
/// never fails.
pub struct Session<H: ViewportHost> {
    observer: Option<H::Observer>,
}

impl<H: ViewportHost + 'static> Session<H> {
    /// Start observing `targets` over `thresholds`, forwarding events of
    /// `kind` to `sink` whenever `paused` is unset.
    pub fn start(
        host: &H,
        thresholds: &[f64],
        targets: &[H::Element],
        kind: EventKind,
        paused: Rc<Cell<bool>>,
        sink: impl FnMut(VisibilityEvent<H::Element>) + 'static,
    ) -> Self {
        if targets.is_empty() {
            tracing::error!(kind = %kind, "no targets to observe; session is inert");
            return Self { observer: None };
        }

        let mut sink = sink;
        let on_batch: Box<dyn FnMut(&[IntersectionRecord<H::Element>])> =
            Box::new(move |records| {
                for record in records {
                    if EventKind::from_ratio(record.ratio) != kind {
                        continue;
                    }
                    if paused.get() {
                        tracing::trace!(kind = %kind, "paused; dropping record");
                        continue;
                    }
                    sink(record.to_event(kind));
                }
            });

        match host.create_observer(thresholds, on_batch) {
            Ok(observer) => {
                for target in targets {
                    observer.observe(target);
                }
                tracing::debug!(kind = %kind, targets = targets.len(), "session started");
                Self {
                    observer: Some(observer),
                }
            }
            Err(err) => {
                tracing::error!(kind = %kind, %err, "observation unavailable; session is inert");
                Self { observer: None }
            }
        }
    }
}

impl<H: ViewportHost> Session<H> {
    /// Whether this session holds a live host observer.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    /// Disconnect the host observer. Idempotent; also runs on drop.
    pub fn stop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl<H: ViewportHost> Drop for Session<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Precision;
    use crate::sim::SimHost;
    use crate::threshold::threshold_table;
    use std::cell::RefCell;

    fn collected() -> (
        Rc<RefCell<Vec<VisibilityEvent<crate::sim::SimElement>>>>,
        impl FnMut(VisibilityEvent<crate::sim::SimElement>) + 'static,
    ) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let seen = Rc::clone(&seen);
            move |event: VisibilityEvent<crate::sim::SimElement>| seen.borrow_mut().push(event)
        };
        (seen, sink)
    }

    fn thresholds() -> Vec<f64> {
        threshold_table(Precision::Low)
    }

    #[test]
    fn enter_session_forwards_positive_ratios_only() {
        let host = SimHost::new();
        let target = host.add_element("#a");
        let (seen, sink) = collected();
        let _session = Session::start(
            &host,
            &thresholds(),
            &[target.clone()],
            EventKind::Enter,
            Rc::new(Cell::new(false)),
            sink,
        );

        host.deliver(&target, 0.37);
        host.deliver(&target, 0.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, EventKind::Enter);
        assert_eq!(seen[0].percentage, 37.0);
    }

    #[test]
    fn exit_session_forwards_zero_ratios_only() {
        let host = SimHost::new();
        let target = host.add_element("#a");
        let (seen, sink) = collected();
        let _session = Session::start(
            &host,
            &thresholds(),
            &[target.clone()],
            EventKind::Exit,
            Rc::new(Cell::new(false)),
            sink,
        );

        host.deliver(&target, 0.37);
        host.deliver(&target, 0.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, EventKind::Exit);
        assert_eq!(seen[0].percentage, 0.0);
    }

    #[test]
    fn paused_flag_is_read_per_record() {
        let host = SimHost::new();
        let a = host.add_element(".item");
        let b = host.add_element(".item");
        let paused = Rc::new(Cell::new(false));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let seen = Rc::clone(&seen);
            let paused = Rc::clone(&paused);
            move |event: VisibilityEvent<crate::sim::SimElement>| {
                // Pause from inside the first dispatch; the rest of the batch
                // must be dropped.
                paused.set(true);
                seen.borrow_mut().push(event.target.id());
            }
        };
        let _session = Session::start(
            &host,
            &thresholds(),
            &[a.clone(), b.clone()],
            EventKind::Enter,
            paused,
            sink,
        );

        host.deliver_batch(&[(a, 0.5), (b, 0.5)]);
        assert_eq!(seen.borrow().len(), 1, "pause mid-batch drops the remainder");
    }

    #[test]
    fn empty_target_set_yields_inert_session() {
        let host = SimHost::new();
        let (seen, sink) = collected();
        let session: Session<SimHost> = Session::start(
            &host,
            &thresholds(),
            &[],
            EventKind::Enter,
            Rc::new(Cell::new(false)),
            sink,
        );
        assert!(!session.is_active());
        assert_eq!(host.observer_count(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unsupported_host_yields_inert_session() {
        let host = SimHost::without_observation();
        let target = host.add_element("#a");
        let (_, sink) = collected();
        let session = Session::start(
            &host,
            &thresholds(),
            &[target],
            EventKind::Enter,
            Rc::new(Cell::new(false)),
            sink,
        );
        assert!(!session.is_active());
    }

    #[test]
    fn stopped_session_forwards_nothing() {
        let host = SimHost::new();
        let target = host.add_element("#a");
        let (seen, sink) = collected();
        let mut session = Session::start(
            &host,
            &thresholds(),
            &[target.clone()],
            EventKind::Enter,
            Rc::new(Cell::new(false)),
            sink,
        );
        session.stop();
        assert!(!session.is_active());

        host.deliver(&target, 0.8);
        assert!(seen.borrow().is_empty());
    }
}

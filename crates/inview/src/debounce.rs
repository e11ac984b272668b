#![forbid(unsafe_code)]

//! Per-target debounce bookkeeping.
//!
//! The ledger maps element identities to pending host timers. Scheduling a
//! dispatch for a target that already has one pending cancels the earlier
//! timer unconditionally, so the callback only ever sees the latest event per
//! target (last-write-wins). With a zero delay the dispatch runs synchronously
//! and no entry is created.
//!
//! # Invariants
//!
//! 1. At most one pending timer per target at any instant.
//! 2. A fired timer removes its ledger entry before the dispatch runs, so a
//!    re-schedule from inside the callback starts from a clean slate.
//! 3. Keys are [`ElementId`]s, never elements: the ledger keeps no element
//!    alive.
//!
//! # Failure Modes
//!
//! `cancel_all` during destroy races nothing — the model is single-threaded —
//! but a timer whose ledger was dropped mid-flight (facade gone, host timer
//! wheel still holding the closure) still runs its dispatch; only the
//! bookkeeping is skipped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use ahash::AHashMap;

use crate::host::{ElementId, ViewportHost};

/// Shared per-target timer ledger. Cloning shares the underlying map.
pub struct DebounceLedger<H: ViewportHost> {
    inner: Rc<Inner<H>>,
}

struct Inner<H: ViewportHost> {
    host: Rc<H>,
    pending: RefCell<AHashMap<ElementId, H::Timer>>,
}

impl<H: ViewportHost> Clone for DebounceLedger<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: ViewportHost + 'static> DebounceLedger<H> {
    /// Create an empty ledger backed by `host`'s timer facility.
    #[must_use]
    pub fn new(host: Rc<H>) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                pending: RefCell::new(AHashMap::new()),
            }),
        }
    }

    /// Schedule `dispatch` for `target` after `delay`.
    ///
    /// Any dispatch already pending for `target` is cancelled first,
    /// discarding its event. A zero delay runs `dispatch` synchronously and
    /// leaves no ledger entry.
    pub fn schedule(&self, target: ElementId, delay: Duration, dispatch: Box<dyn FnOnce()>) {
        if let Some(timer) = self.inner.pending.borrow_mut().remove(&target) {
            tracing::trace!(%target, "superseding pending dispatch");
            self.inner.host.cancel_timer(timer);
        }

        if delay.is_zero() {
            dispatch();
            return;
        }

        let ledger = Rc::downgrade(&self.inner);
        let timer = self.inner.host.start_timer(
            delay,
            Box::new(move || {
                // Entry out before the callback runs, so a schedule() from
                // inside the callback is not self-cancelled.
                if let Some(ledger) = Weak::upgrade(&ledger) {
                    ledger.pending.borrow_mut().remove(&target);
                }
                dispatch();
            }),
        );
        self.inner.pending.borrow_mut().insert(target, timer);
    }

    /// Cancel every pending timer and clear the ledger. Destroy path only.
    pub fn cancel_all(&self) {
        let drained: Vec<(ElementId, H::Timer)> =
            self.inner.pending.borrow_mut().drain().collect();
        for (_, timer) in drained {
            self.inner.host.cancel_timer(timer);
        }
    }

    /// Number of targets with a dispatch currently pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.borrow().len()
    }
}

#![forbid(unsafe_code)]

//! The multiplexer facade.
//!
//! [`InView`] owns the configuration, the target set (resolved once at
//! construction, never re-resolved), the shared threshold table, the debounce
//! ledger, and the registry of active sessions. Every lifecycle method
//! returns `&mut Self` so calls chain.
//!
//! # State machine
//!
//! `{active, paused}` with initial state active. Destroyed is a dead
//! configuration, not a revisitable state: after [`destroy`](InView::destroy)
//! the instance stays usable but inert — further [`on`](InView::on) calls
//! attach a session with no observable targets instead of panicking.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::Config;
use crate::debounce::DebounceLedger;
use crate::event::{EventKind, VisibilityEvent};
use crate::host::ViewportHost;
use crate::session::Session;
use crate::threshold::threshold_table;

/// Visibility event multiplexer over one host and one target set.
pub struct InView<H: ViewportHost> {
    host: Rc<H>,
    config: Config,
    targets: Vec<H::Element>,
    thresholds: Vec<f64>,
    paused: Rc<Cell<bool>>,
    delay: Rc<Cell<Duration>>,
    ledger: DebounceLedger<H>,
    sessions: Vec<Session<H>>,
}

impl<H: ViewportHost + 'static> InView<H> {
    /// Construct from a host and a config (or bare selector, via
    /// `impl Into<Config>`).
    ///
    /// The selector is resolved exactly once, here: `query_first` in single
    /// mode, `query` otherwise. Later host mutations do not change the
    /// target set.
    pub fn new(host: H, config: impl Into<Config>) -> Self {
        let config = config.into();
        let host = Rc::new(host);

        let targets = if config.single {
            host.query_first(&config.selector).into_iter().collect()
        } else {
            host.query(&config.selector)
        };
        tracing::debug!(
            selector = %config.selector,
            targets = targets.len(),
            precision = config.precision.as_str(),
            single = config.single,
            "inview constructed"
        );

        let thresholds = threshold_table(config.precision);
        let delay = Rc::new(Cell::new(config.delay));
        let ledger = DebounceLedger::new(Rc::clone(&host));

        Self {
            host,
            config,
            targets,
            thresholds,
            paused: Rc::new(Cell::new(false)),
            delay,
            ledger,
            sessions: Vec::new(),
        }
    }

    /// Register `callback` for `kind` events over the current target set.
    ///
    /// Creates one new session sharing this instance's threshold table. Each
    /// forwarded record routes through the debounce ledger keyed by the
    /// record's target, reading the delay in force at schedule time. Chains;
    /// different kinds may be registered on the same instance.
    pub fn on(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(VisibilityEvent<H::Element>) + 'static,
    ) -> &mut Self {
        let callback: Rc<std::cell::RefCell<dyn FnMut(VisibilityEvent<H::Element>)>> =
            Rc::new(std::cell::RefCell::new(callback));
        let ledger = self.ledger.clone();
        let delay = Rc::clone(&self.delay);

        let session = Session::start(
            self.host.as_ref(),
            &self.thresholds,
            &self.targets,
            kind,
            Rc::clone(&self.paused),
            move |event: VisibilityEvent<H::Element>| {
                let key = H::element_id(&event.target);
                let callback = Rc::clone(&callback);
                ledger.schedule(
                    key,
                    delay.get(),
                    Box::new(move || {
                        let mut callback = callback.borrow_mut();
                        (&mut *callback)(event);
                    }),
                );
            },
        );
        self.sessions.push(session);
        self
    }

    /// Stop dispatching events. Observation continues silently; records
    /// delivered while paused are dropped at dispatch time.
    pub fn pause(&mut self) -> &mut Self {
        self.paused.set(true);
        self
    }

    /// Resume dispatching for records delivered from now on.
    pub fn resume(&mut self) -> &mut Self {
        self.paused.set(false);
        self
    }

    /// Replace the debounce delay.
    ///
    /// Applies to dispatches scheduled after this call; timers already in
    /// flight keep their original deadline.
    pub fn set_delay(&mut self, delay: Duration) -> &mut Self {
        self.delay.set(delay);
        self
    }

    /// Tear everything down: cancel all pending debounced dispatches, stop
    /// every session, clear the registry and the target set, reset pause.
    ///
    /// Immediate and total — nothing scheduled before this call fires after
    /// it returns. The instance stays chainable but inert afterwards.
    pub fn destroy(&mut self) -> &mut Self {
        self.ledger.cancel_all();
        self.sessions.clear();
        self.paused.set(false);
        self.targets.clear();
        tracing::debug!(selector = %self.config.selector, "inview destroyed");
        self
    }

    /// Whether dispatch is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// The debounce delay currently in force.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay.get()
    }

    /// Number of elements under observation.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Number of sessions registered since construction (or the last
    /// destroy).
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The construction-time configuration. The delay field reflects the
    /// value given at construction; see [`delay`](Self::delay) for the
    /// current one.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

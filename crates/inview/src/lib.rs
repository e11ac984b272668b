#![forbid(unsafe_code)]

//! Viewport visibility event multiplexing for host-observed elements.
//!
//! `inview` watches a set of target elements and invokes user callbacks when
//! each target enters or exits the visible viewport. All geometry is delegated
//! to a host-provided intersection primitive (the [`ViewportHost`] trait);
//! this crate owns the stateful machinery around it:
//!
//! - [`threshold_table`]: the ordered sampling fractions derived from a
//!   [`Precision`] tier.
//! - [`DebounceLedger`]: per-target timer bookkeeping with last-write-wins
//!   semantics.
//! - [`Session`]: one host observer bound to a threshold table and a target
//!   set, translating raw intersection records into enter/exit events.
//! - [`InView`]: the facade owning configuration, the target set, the ledger,
//!   and every active session.
//!
//! # Architecture
//!
//! The engine is single-threaded and event-driven: all work runs inside
//! callbacks delivered by the host's observation primitive and timer facility.
//! Shared state (the paused flag, the current delay, the ledger) uses
//! `Rc`/`Cell`/`RefCell`; there are no locks and no `Send` bounds.
//!
//! # Invariants
//!
//! 1. A threshold table is computed once per [`InView`] instance and reused by
//!    every session it creates.
//! 2. At most one pending debounce timer exists per target at any instant.
//! 3. A record with intersection ratio > 0 is an enter event; a ratio of
//!    exactly 0 is an exit event. A single record never fires both.
//! 4. Pause gates dispatch, not observation: sessions keep receiving records
//!    while paused, and the flag is read per record at dispatch time.
//! 5. [`InView::destroy`] is immediate and total: no dispatch scheduled before
//!    it is observed after it returns.
//!
//! # Failure Modes
//!
//! Nothing in the public surface panics or returns an error to the caller. A
//! selector that matches nothing, or a host without the observation primitive,
//! degrades to an inert session plus a `tracing` diagnostic, preserving method
//! chaining.
//!
//! # Example
//!
//! ```ignore
//! use inview::{Config, EventKind, InView, Precision};
//! use std::time::Duration;
//!
//! let mut inview = InView::new(
//!     host,
//!     Config::new(".card")
//!         .precision(Precision::Low)
//!         .delay(Duration::from_millis(100)),
//! );
//! inview
//!     .on(EventKind::Enter, |e| println!("visible: {:.0}%", e.percentage))
//!     .on(EventKind::Exit, |e| println!("gone: {}", e.kind));
//! ```

pub mod config;
pub mod debounce;
pub mod event;
pub mod host;
pub mod inview;
pub mod session;
#[cfg(any(test, feature = "test-helpers"))]
pub mod sim;
pub mod threshold;

pub use config::{Config, Precision};
pub use debounce::DebounceLedger;
pub use event::{EventKind, Rect, VisibilityEvent};
pub use host::{
    BatchCallback, ElementId, HostError, IntersectionObserver, IntersectionRecord, ViewportHost,
};
pub use inview::InView;
pub use session::Session;
pub use threshold::threshold_table;

#![forbid(unsafe_code)]

//! Threshold table derivation.
//!
//! The host observer fires once each time a target's intersection ratio
//! crosses a listed threshold, so the table's granularity bounds the
//! granularity of percentage reporting. The table is built from integer
//! numerators (`i / n` for `i in 0..=n`) rather than by accumulating a
//! floating-point step, which guarantees the endpoints and the strictly
//! increasing order with no drift.
//!
//! # Invariants
//!
//! 1. Non-empty, strictly increasing.
//! 2. First element is exactly 0.0, last element is exactly 1.0.
//! 3. Length is `slices + 1` for the tier's slice count.

use crate::config::Precision;

/// Build the ordered threshold sequence for `precision`.
///
/// Computed once per [`InView`](crate::InView) instance and shared by every
/// session that instance creates.
#[must_use]
pub fn threshold_table(precision: Precision) -> Vec<f64> {
    let slices = precision.slices();
    (0..=slices)
        .map(|i| f64::from(i) / f64::from(slices))
        .collect()
}

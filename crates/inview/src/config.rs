#![forbid(unsafe_code)]

//! Construction-time configuration for the [`InView`](crate::InView) facade.
//!
//! A [`Config`] is fixed once the facade is constructed, with one exception:
//! the debounce delay, which stays mutable through
//! [`InView::set_delay`](crate::InView::set_delay). A bare selector converts
//! into a config with all defaults, so `InView::new(host, ".card")` works.
//!
//! # Invariants
//!
//! 1. The delay is a [`Duration`], so it can never be negative.
//! 2. [`Precision`] is a closed enum; an unrecognized tier cannot be
//!    represented. String parsing falls back to [`Precision::Medium`] rather
//!    than erroring.

use std::time::Duration;

/// Sampling precision tier for the threshold table.
///
/// Finer tiers yield finer-grained percentage reporting at the cost of a
/// higher callback volume from the host observer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 0.1 steps (11 thresholds).
    Low,
    /// 0.01 steps (101 thresholds).
    #[default]
    Medium,
    /// 0.001 steps (1001 thresholds).
    High,
}

impl Precision {
    /// The spacing between consecutive thresholds for this tier.
    #[must_use]
    pub const fn step(self) -> f64 {
        match self {
            Self::Low => 0.1,
            Self::Medium => 0.01,
            Self::High => 0.001,
        }
    }

    /// Number of equal slices the [0, 1] range is divided into.
    #[must_use]
    pub(crate) const fn slices(self) -> u32 {
        match self {
            Self::Low => 10,
            Self::Medium => 100,
            Self::High => 1000,
        }
    }

    /// Parse a tier name, falling back to [`Precision::Medium`] for anything
    /// unrecognized. Never errors.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Canonical tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl From<&str> for Precision {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Configuration for one [`InView`](crate::InView) instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Selector resolved once, at construction, against the host.
    pub selector: String,
    /// Debounce delay applied per target. Zero means synchronous dispatch.
    pub delay: Duration,
    /// Sampling precision for the threshold table.
    pub precision: Precision,
    /// Observe only the first match instead of every match.
    pub single: bool,
}

impl Config {
    /// Create a config for `selector` with default delay (zero), precision
    /// ([`Precision::Medium`]) and multi-target mode.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            delay: Duration::ZERO,
            precision: Precision::default(),
            single: false,
        }
    }

    /// Set the debounce delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the sampling precision tier.
    #[must_use]
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Observe only the first element the selector matches.
    #[must_use]
    pub fn single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }
}

impl From<&str> for Config {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}

impl From<String> for Config {
    fn from(selector: String) -> Self {
        Self::new(selector)
    }
}

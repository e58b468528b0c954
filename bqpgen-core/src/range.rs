//! Closed numeric intervals describing legal site biases and coupler weights.

use serde::{Deserialize, Serialize};

use crate::{BqpError, Result};

/// A closed interval `[low, high]` with `low < high`.
///
/// # Examples
/// ```
/// use bqpgen_core::ValueRange;
///
/// let range = ValueRange::new(-2.0, 1.5).expect("range is valid");
/// assert!(range.contains(-2.0));
/// assert!(!range.contains(1.6));
/// assert_eq!(range.symmetric_bound(), 1.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    low: f64,
    high: f64,
}

impl ValueRange {
    /// Default site-bias range of a full-yield synthesized lattice.
    pub const DEFAULT_SITE: Self = Self {
        low: -2.0,
        high: 2.0,
    };

    /// Default coupler-weight range of a full-yield synthesized lattice.
    pub const DEFAULT_COUPLER: Self = Self {
        low: -1.0,
        high: 1.0,
    };

    /// Creates a range, rejecting inverted, empty or non-finite bounds.
    ///
    /// # Errors
    /// Returns [`BqpError::DegenerateRange`] unless `low < high` and both
    /// bounds are finite.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        Self::named("value range", low, high)
    }

    pub(crate) fn named(name: &'static str, low: f64, high: f64) -> Result<Self> {
        if low.is_finite() && high.is_finite() && low < high {
            Ok(Self { low, high })
        } else {
            Err(BqpError::DegenerateRange { name, low, high })
        }
    }

    /// Lower bound. The most negative value is the strongest ferromagnetic
    /// coupling.
    #[must_use]
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound. The most positive value is the strongest
    /// antiferromagnetic coupling.
    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Returns whether `value` lies inside the range, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// Largest magnitude that can be used with either sign.
    #[must_use]
    pub fn symmetric_bound(&self) -> f64 {
        self.low.abs().min(self.high.abs())
    }

    pub(crate) fn check(&self) -> Result<()> {
        Self::named("value range", self.low, self.high).map(|_| ())
    }
}

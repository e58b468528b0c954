//! Bounded retry accounting for loop sampling.
//!
//! [`SamplingSession`] is an explicit state machine. Callers draw a sample
//! while the session is [`SamplerState::Sampling`], record the verdict with
//! [`SamplingSession::accept`] or [`SamplingSession::reject`], then call
//! [`SamplingSession::advance`] to learn whether sampling continues.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BqpError, InsufficientLoops, Result};

/// How rejected samples count against the rejection budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectCounting {
    /// Only an unbroken run of rejections counts; an accepted loop resets the
    /// counter.
    #[default]
    Consecutive,
    /// Every rejection since sampling began counts.
    Cumulative,
}

/// The budget that stopped a session before its target was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLimit {
    /// Too many rejected candidates.
    Rejections,
    /// Too many samples in total.
    Samples,
}

impl fmt::Display for BudgetLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rejections => "rejection",
            Self::Samples => "sample",
        })
    }
}

/// Observable phase of a [`SamplingSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SamplerState {
    /// Ready for the next sample.
    Sampling,
    /// The last sample was accepted; call [`SamplingSession::advance`].
    Accepted,
    /// The last sample was rejected; call [`SamplingSession::advance`].
    Rejected,
    /// The accepted length reached the target.
    Complete,
    /// A budget ran out before the target was reached.
    BudgetExhausted(BudgetLimit),
}

impl SamplerState {
    /// Returns whether the session has stopped for good.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::BudgetExhausted(_))
    }
}

/// Limits applied to one sampling session.
///
/// # Examples
/// ```
/// use bqpgen_core::{RejectCounting, SamplingBudget};
///
/// let budget = SamplingBudget::new(6.4, 1000, 10_000)?
///     .with_reject_counting(RejectCounting::Cumulative);
/// assert_eq!(budget.sample_limit(), 10_000);
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingBudget {
    target_length: f64,
    reject_limit: usize,
    sample_limit: usize,
    reject_counting: RejectCounting,
}

impl SamplingBudget {
    /// Creates a budget counting consecutive rejections.
    ///
    /// # Errors
    /// Returns [`BqpError::InvalidParameter`] when the target is negative or
    /// not finite, or when either limit is zero.
    pub fn new(target_length: f64, reject_limit: usize, sample_limit: usize) -> Result<Self> {
        if !target_length.is_finite() || target_length < 0.0 {
            return Err(BqpError::invalid_parameter(
                "target_length",
                format!("must be a finite, non-negative length (got {target_length})"),
            ));
        }
        if reject_limit == 0 {
            return Err(BqpError::invalid_parameter(
                "loop_reject_limit",
                "must be at least 1",
            ));
        }
        if sample_limit == 0 {
            return Err(BqpError::invalid_parameter(
                "loop_sample_limit",
                "must be at least 1",
            ));
        }
        Ok(Self {
            target_length,
            reject_limit,
            sample_limit,
            reject_counting: RejectCounting::default(),
        })
    }

    /// Selects how rejections are counted.
    #[must_use]
    pub const fn with_reject_counting(mut self, counting: RejectCounting) -> Self {
        self.reject_counting = counting;
        self
    }

    /// Accepted loop length at which sampling completes.
    #[must_use]
    pub const fn target_length(&self) -> f64 {
        self.target_length
    }

    /// Rejections tolerated before giving up.
    #[must_use]
    pub const fn reject_limit(&self) -> usize {
        self.reject_limit
    }

    /// Samples tolerated before giving up.
    #[must_use]
    pub const fn sample_limit(&self) -> usize {
        self.sample_limit
    }

    /// Rejection counting mode.
    #[must_use]
    pub const fn reject_counting(&self) -> RejectCounting {
        self.reject_counting
    }
}

/// Summary of one sampling session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopReport {
    /// Accepted length the session aimed for.
    pub target_length: f64,
    /// Sum of the accepted loop lengths.
    pub accepted_length: usize,
    /// Number of accepted loops.
    pub accepted_loops: usize,
    /// Samples drawn.
    pub samples: usize,
    /// Samples rejected over the whole session.
    pub rejections: usize,
    /// The budget that stopped the session, if the target was missed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhausted: Option<BudgetLimit>,
}

impl LoopReport {
    /// Describes the shortfall when the target was not reached.
    #[must_use]
    pub fn shortfall(&self) -> Option<InsufficientLoops> {
        self.exhausted.map(|limit| InsufficientLoops {
            target_length: self.target_length,
            achieved_length: self.accepted_length,
            accepted_loops: self.accepted_loops,
            limit,
        })
    }
}

/// State machine tracking samples, rejections and accepted length.
///
/// Termination is checked in a fixed order: target reached, rejection budget,
/// sample budget.
///
/// # Examples
/// ```
/// use bqpgen_core::{SamplerState, SamplingBudget, SamplingSession};
///
/// let budget = SamplingBudget::new(8.0, 5, 100)?;
/// let mut session = SamplingSession::new(budget);
/// assert_eq!(session.state(), SamplerState::Sampling);
/// session.reject();
/// assert_eq!(session.advance(), SamplerState::Sampling);
/// session.accept(8);
/// assert_eq!(session.advance(), SamplerState::Complete);
/// assert_eq!(session.report().accepted_loops, 1);
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SamplingSession {
    budget: SamplingBudget,
    state: SamplerState,
    samples: usize,
    rejections: usize,
    rejection_run: usize,
    accepted_length: usize,
    accepted_loops: usize,
}

impl SamplingSession {
    /// Opens a session. A zero target completes immediately.
    #[must_use]
    pub fn new(budget: SamplingBudget) -> Self {
        let mut session = Self {
            budget,
            state: SamplerState::Sampling,
            samples: 0,
            rejections: 0,
            rejection_run: 0,
            accepted_length: 0,
            accepted_loops: 0,
        };
        session.state = session.evaluate();
        session
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> SamplerState {
        self.state
    }

    /// Records an accepted loop of `length` edges. Ignored unless the session
    /// is [`SamplerState::Sampling`].
    pub fn accept(&mut self, length: usize) {
        if self.state != SamplerState::Sampling {
            return;
        }
        self.samples += 1;
        self.accepted_loops += 1;
        self.accepted_length += length;
        if self.budget.reject_counting == RejectCounting::Consecutive {
            self.rejection_run = 0;
        }
        self.state = SamplerState::Accepted;
    }

    /// Records a rejected sample. Ignored unless the session is
    /// [`SamplerState::Sampling`].
    pub fn reject(&mut self) {
        if self.state != SamplerState::Sampling {
            return;
        }
        self.samples += 1;
        self.rejections += 1;
        self.rejection_run += 1;
        self.state = SamplerState::Rejected;
    }

    /// Moves out of [`SamplerState::Accepted`] or [`SamplerState::Rejected`]
    /// and returns the new state. Other states are left unchanged.
    pub fn advance(&mut self) -> SamplerState {
        if matches!(self.state, SamplerState::Accepted | SamplerState::Rejected) {
            self.state = self.evaluate();
        }
        self.state
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "accepted lengths are far below 2^52"
    )]
    fn evaluate(&self) -> SamplerState {
        if self.accepted_length as f64 >= self.budget.target_length {
            SamplerState::Complete
        } else if self.rejection_run >= self.budget.reject_limit {
            SamplerState::BudgetExhausted(BudgetLimit::Rejections)
        } else if self.samples >= self.budget.sample_limit {
            SamplerState::BudgetExhausted(BudgetLimit::Samples)
        } else {
            SamplerState::Sampling
        }
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn report(&self) -> LoopReport {
        LoopReport {
            target_length: self.budget.target_length,
            accepted_length: self.accepted_length,
            accepted_loops: self.accepted_loops,
            samples: self.samples,
            rejections: self.rejections,
            exhausted: match self.state {
                SamplerState::BudgetExhausted(limit) => Some(limit),
                _ => None,
            },
        }
    }
}

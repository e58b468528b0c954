//! Frustrated loops (FL).
//!
//! Weights accumulate in integer units of `bound / steps`. Every accepted
//! loop adds one unit to each of its couplers except a single randomly
//! chosen coupler, which loses one. A loop is only accepted when its
//! contributions leave every touched coupler within `steps` units and with
//! an unchanged sign, so each accepted loop keeps a negative sign product
//! for the rest of the run.

use std::collections::BTreeMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{Assignment, GenerationReport, Generator, GeneratorKind, level, signed_bound};
use crate::{
    BqpError, Result,
    sampler::{
        Loop, LoopSampler, RejectCounting, SamplerState, SamplingBudget, SamplingSession,
        WalkOutcome,
    },
    topology::{Coupler, Topology},
};

/// Parameters of the frustrated-loop generator.
///
/// # Examples
/// ```
/// use bqpgen_core::{FlParams, RejectCounting};
///
/// let params = FlParams::default();
/// assert_eq!(params.steps, 2);
/// assert_eq!(params.min_loop_length, 7);
/// assert_eq!(params.reject_counting, RejectCounting::Consecutive);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlParams {
    /// Units per full-scale weight.
    pub steps: u32,
    /// Target ratio of accepted loop length to active sites.
    pub alpha: f64,
    /// Shortest loop that may be accepted.
    pub min_loop_length: usize,
    /// Rejections tolerated before giving up.
    pub loop_reject_limit: usize,
    /// Samples tolerated before giving up.
    pub loop_sample_limit: usize,
    /// How rejections count against `loop_reject_limit`.
    pub reject_counting: RejectCounting,
}

impl Default for FlParams {
    fn default() -> Self {
        Self {
            steps: 2,
            alpha: 0.2,
            min_loop_length: 7,
            loop_reject_limit: 1000,
            loop_sample_limit: 10_000,
            reject_counting: RejectCounting::Consecutive,
        }
    }
}

/// Plants frustrated loops found by rejection-sampled random walks.
#[derive(Clone, Copy, Debug)]
pub struct FlGenerator {
    params: FlParams,
}

impl FlGenerator {
    /// Validates the parameters.
    ///
    /// # Errors
    /// Returns [`BqpError::InvalidParameter`] when `steps` or either budget is
    /// zero, or when `alpha` is not a finite positive number.
    pub fn new(params: FlParams) -> Result<Self> {
        if params.steps == 0 {
            return Err(BqpError::invalid_parameter("steps", "must be at least 1"));
        }
        if !params.alpha.is_finite() || params.alpha <= 0.0 {
            return Err(BqpError::invalid_parameter(
                "alpha",
                format!("must be a finite positive ratio (got {})", params.alpha),
            ));
        }
        // Budget limits are validated up front; the target depends on the topology.
        SamplingBudget::new(0.0, params.loop_reject_limit, params.loop_sample_limit)?;
        Ok(Self { params })
    }

    /// Validated parameters.
    #[must_use]
    pub const fn params(&self) -> &FlParams {
        &self.params
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "the target length is a real-valued fraction of the site count"
    )]
    fn target_length(&self, sites: usize) -> f64 {
        self.params.alpha * sites as f64
    }
}

/// Per-coupler contributions of `cycle`: `+1` everywhere except `flipped`.
fn contributions(cycle: &Loop, flipped: usize) -> Vec<(Coupler, i64)> {
    cycle
        .couplers()
        .enumerate()
        .map(|(position, coupler)| (coupler, if position == flipped { -1 } else { 1 }))
        .collect()
}

/// Returns whether adding `deltas` keeps every coupler within `steps` units
/// without flipping the sign of an existing weight.
fn fits(units: &BTreeMap<Coupler, i64>, deltas: &[(Coupler, i64)], steps: i64) -> bool {
    deltas.iter().all(|(coupler, delta)| {
        let current = units.get(coupler).copied().unwrap_or(0);
        let same_sign = current == 0 || current.signum() == delta.signum();
        same_sign && (current + delta).abs() <= steps
    })
}

impl Generator for FlGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Fl
    }

    #[instrument(
        name = "core.generate_fl",
        err,
        skip(self, topology, rng),
        fields(sites = topology.sites().len(), alpha = self.params.alpha)
    )]
    fn generate(&self, topology: &Topology, rng: &mut dyn RngCore) -> Result<Assignment> {
        let steps = i64::from(self.params.steps);
        let bound = signed_bound(topology.coupler_range(), "coupler_range")?;
        let budget = SamplingBudget::new(
            self.target_length(topology.sites().len()),
            self.params.loop_reject_limit,
            self.params.loop_sample_limit,
        )?
        .with_reject_counting(self.params.reject_counting);

        let sampler = LoopSampler::new(topology);
        let mut session = SamplingSession::new(budget);
        let mut units: BTreeMap<Coupler, i64> = BTreeMap::new();
        while session.state() == SamplerState::Sampling {
            match sampler.sample_walk(&mut *rng) {
                WalkOutcome::Closed(cycle) if cycle.len() >= self.params.min_loop_length => {
                    let flipped = rng.gen_range(0..cycle.len());
                    let deltas = contributions(&cycle, flipped);
                    if fits(&units, &deltas, steps) {
                        for (coupler, delta) in deltas {
                            *units.entry(coupler).or_insert(0) += delta;
                        }
                        debug!(length = cycle.len(), "accepted loop");
                        session.accept(cycle.len());
                    } else {
                        debug!(length = cycle.len(), "rejected loop exceeding coupler range");
                        session.reject();
                    }
                }
                WalkOutcome::Closed(cycle) => {
                    debug!(length = cycle.len(), "rejected short loop");
                    session.reject();
                }
                WalkOutcome::DeadEnd { length } => {
                    debug!(length, "rejected dead-end walk");
                    session.reject();
                }
            }
            session.advance();
        }

        let report = session.report();
        if let Some(shortfall) = report.shortfall() {
            warn!(
                target_length = shortfall.target_length,
                achieved_length = shortfall.achieved_length,
                accepted_loops = shortfall.accepted_loops,
                limit = %shortfall.limit,
                "{shortfall}"
            );
        } else {
            info!(
                accepted_length = report.accepted_length,
                accepted_loops = report.accepted_loops,
                samples = report.samples,
                "planted frustrated loops"
            );
        }

        let couplings = units
            .into_iter()
            .filter(|(_, amount)| *amount != 0)
            .map(|(coupler, amount)| (coupler, level(bound, amount, steps)))
            .collect();
        Ok(Assignment::new(BTreeMap::new(), couplings).with_report(GenerationReport::Loops(report)))
    }
}

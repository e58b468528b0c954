//! Instance generation strategies.
//!
//! Each generator reads a [`Topology`] and a random source and returns an
//! [`Assignment`] of site biases and coupler weights. Randomness is only ever
//! consumed while iterating sorted sites, couplers or adjacency lists.

mod clq;
mod fl;
mod ran;
mod wscn;

use std::{collections::BTreeMap, fmt};

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{
    BqpError, Result,
    range::ValueRange,
    sampler::LoopReport,
    topology::{Coupler, SiteId, Topology},
};

pub use self::{
    clq::{ClqGenerator, CliqueReport},
    fl::{FlGenerator, FlParams},
    ran::{RanGenerator, RanParams},
    wscn::{WscnGenerator, WscnParams, effective_wscn_degree},
};

/// Identifies a generation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Discretized random couplings.
    Ran,
    /// Native clique embedding.
    Clq,
    /// Frustrated loops.
    Fl,
    /// Weak-strong cluster network.
    Wscn,
}

impl GeneratorKind {
    /// Short lowercase name used in metadata and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ran => "ran",
            Self::Clq => "clq",
            Self::Fl => "fl",
            Self::Wscn => "wscn",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generator-specific diagnostics attached to an [`Assignment`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationReport {
    /// The generator has nothing to report.
    #[default]
    Empty,
    /// Size of the embedded clique.
    Clique(CliqueReport),
    /// Outcome of frustrated-loop sampling.
    Loops(LoopReport),
}

impl GenerationReport {
    /// Returns whether there is nothing to report.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Site biases and coupler weights produced by one generator run.
///
/// Entries absent from either map are zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    fields: BTreeMap<SiteId, f64>,
    couplings: BTreeMap<Coupler, f64>,
    report: GenerationReport,
}

impl Assignment {
    /// Wraps precomputed maps.
    #[must_use]
    pub const fn new(fields: BTreeMap<SiteId, f64>, couplings: BTreeMap<Coupler, f64>) -> Self {
        Self {
            fields,
            couplings,
            report: GenerationReport::Empty,
        }
    }

    /// Attaches generator diagnostics.
    #[must_use]
    pub fn with_report(mut self, report: GenerationReport) -> Self {
        self.report = report;
        self
    }

    /// Site biases keyed by site.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<SiteId, f64> {
        &self.fields
    }

    /// Coupler weights keyed by canonical coupler.
    #[must_use]
    pub const fn couplings(&self) -> &BTreeMap<Coupler, f64> {
        &self.couplings
    }

    /// Generator diagnostics.
    #[must_use]
    pub const fn report(&self) -> &GenerationReport {
        &self.report
    }

    /// Bias of `site`, zero when unassigned.
    #[must_use]
    pub fn field(&self, site: SiteId) -> f64 {
        self.fields.get(&site).copied().unwrap_or(0.0)
    }

    /// Weight of `coupler`, zero when unassigned.
    #[must_use]
    pub fn coupling(&self, coupler: &Coupler) -> f64 {
        self.couplings.get(coupler).copied().unwrap_or(0.0)
    }
}

/// A strategy turning a topology into an [`Assignment`].
///
/// The random source is a trait object so strategies can be selected at run
/// time; deterministic strategies simply ignore it.
pub trait Generator {
    /// Which strategy this is.
    fn kind(&self) -> GeneratorKind;

    /// Produces biases and weights for `topology`.
    ///
    /// # Errors
    /// Returns a configuration error for unusable parameters or ranges and
    /// [`BqpError::TopologyTooSmall`] when the structure does not fit.
    fn generate(&self, topology: &Topology, rng: &mut dyn RngCore) -> Result<Assignment>;
}

/// Largest magnitude usable with both signs, rejecting ranges that do not
/// straddle zero.
pub(crate) fn signed_bound(range: &ValueRange, name: &'static str) -> Result<f64> {
    let bound = range.symmetric_bound();
    if bound > 0.0 {
        Ok(bound)
    } else {
        Err(BqpError::invalid_parameter(
            name,
            format!(
                "[{}, {}] must contain both signs to be discretized",
                range.low(),
                range.high()
            ),
        ))
    }
}

/// Maps `units` out of `steps` onto `[-bound, bound]`.
///
/// Full-scale units return exactly `±bound` so the extremes never drift past
/// the range through rounding.
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "discretization levels are real-valued fractions of the bound"
)]
pub(crate) fn level(bound: f64, units: i64, steps: i64) -> f64 {
    if units.abs() >= steps {
        bound.copysign(units as f64)
    } else {
        bound * units as f64 / steps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(1.0, 1, 1, 1.0)]
    #[case(1.0, -1, 1, -1.0)]
    #[case(2.0, 1, 2, 1.0)]
    #[case(2.0, -2, 2, -2.0)]
    #[case(0.5, 3, 4, 0.375)]
    fn levels_scale_the_bound(
        #[case] bound: f64,
        #[case] units: i64,
        #[case] steps: i64,
        #[case] expected: f64,
    ) {
        assert_eq!(level(bound, units, steps), expected);
    }

    #[test]
    fn full_scale_levels_hit_the_bound_exactly() {
        let bound = 0.3;
        assert_eq!(level(bound, 7, 7), bound);
        assert_eq!(level(bound, -7, 7), -bound);
    }

    #[test]
    fn ranges_without_both_signs_are_rejected() {
        let range = ValueRange::new(0.0, 1.0).expect("range is valid");
        let err = signed_bound(&range, "coupler_range").expect_err("bound must be rejected");
        assert_eq!(err.code().as_str(), "BQP_INVALID_PARAMETER");
    }

    #[test]
    fn reports_are_tagged_by_kind() {
        let json = serde_json::to_string(&GenerationReport::Clique(CliqueReport {
            logical_nodes: 8,
            chain_length: 3,
        }))
        .expect("serialize");
        assert_eq!(json, r#"{"kind":"clique","logical_nodes":8,"chain_length":3}"#);
    }

    #[test]
    fn unassigned_entries_read_as_zero() {
        let assignment = Assignment::default();
        assert_eq!(assignment.field(SiteId::new(3)), 0.0);
        assert!(assignment.couplings().is_empty());
        assert_eq!(assignment.report(), &GenerationReport::Empty);
    }
}

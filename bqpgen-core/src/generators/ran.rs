//! Discretized random couplings (RAN).

use std::collections::BTreeMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{Assignment, Generator, GeneratorKind, level, signed_bound};
use crate::{BqpError, Result, topology::Topology};

/// Parameters of the random generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RanParams {
    /// Number of magnitude levels on each side of zero.
    pub steps: u32,
    /// Whether sites receive random biases as well.
    pub field: bool,
}

impl Default for RanParams {
    fn default() -> Self {
        Self {
            steps: 1,
            field: false,
        }
    }
}

/// Draws every coupler weight, and optionally every site bias, uniformly from
/// `2 * steps` levels `±(i / steps) * bound`.
///
/// Couplers are drawn first in sorted order, then sites in sorted order.
///
/// # Examples
/// ```
/// use bqpgen_core::{Generator, RanGenerator, RanParams, Topology};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let topology = Topology::synthesize_full_yield(1)?;
/// let generator = RanGenerator::new(RanParams::default())?;
/// let assignment = generator.generate(&topology, &mut StdRng::seed_from_u64(0))?;
/// assert_eq!(assignment.couplings().len(), 16);
/// assert!(assignment.couplings().values().all(|w| w.abs() == 1.0));
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RanGenerator {
    params: RanParams,
}

impl RanGenerator {
    /// Validates the parameters.
    ///
    /// # Errors
    /// Returns [`BqpError::InvalidParameter`] when `steps` is zero.
    pub fn new(params: RanParams) -> Result<Self> {
        if params.steps == 0 {
            return Err(BqpError::invalid_parameter("steps", "must be at least 1"));
        }
        Ok(Self { params })
    }

    /// Validated parameters.
    #[must_use]
    pub const fn params(&self) -> &RanParams {
        &self.params
    }
}

fn draw_units(rng: &mut dyn RngCore, steps: i64) -> i64 {
    let offset = rng.gen_range(0..2 * steps) - steps;
    if offset >= 0 { offset + 1 } else { offset }
}

impl Generator for RanGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Ran
    }

    #[instrument(
        name = "core.generate_ran",
        err,
        skip(self, topology, rng),
        fields(steps = self.params.steps, field = self.params.field)
    )]
    fn generate(&self, topology: &Topology, rng: &mut dyn RngCore) -> Result<Assignment> {
        let steps = i64::from(self.params.steps);
        let coupler_bound = signed_bound(topology.coupler_range(), "coupler_range")?;
        let site_bound = if self.params.field {
            Some(signed_bound(topology.site_range(), "site_range")?)
        } else {
            None
        };

        let couplings: BTreeMap<_, _> = topology
            .couplers()
            .iter()
            .map(|coupler| (*coupler, level(coupler_bound, draw_units(rng, steps), steps)))
            .collect();
        let fields: BTreeMap<_, _> = match site_bound {
            Some(bound) => topology
                .sites()
                .iter()
                .map(|site| (*site, level(bound, draw_units(rng, steps), steps)))
                .collect(),
            None => BTreeMap::new(),
        };
        debug!(
            couplers = couplings.len(),
            sites = fields.len(),
            "drew random levels"
        );
        Ok(Assignment::new(fields, couplings))
    }
}

//! Weak-strong cluster networks (WSCN).
//!
//! The view is tiled by 3x3 blocks of unit cells. The centre cell of each
//! tile is a strong cluster; the four cells sharing an edge with it are weak
//! clusters; the corners are idle.

use std::collections::BTreeMap;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{Assignment, Generator, GeneratorKind};
use crate::{
    BqpError, Result,
    topology::{SiteId, Topology},
};

const TILE: usize = 3;

/// Largest multiple of three not exceeding `degree`.
///
/// # Examples
/// ```
/// use bqpgen_core::effective_wscn_degree;
///
/// assert_eq!(effective_wscn_degree(12), 12);
/// assert_eq!(effective_wscn_degree(8), 6);
/// assert_eq!(effective_wscn_degree(2), 0);
/// ```
#[must_use]
pub const fn effective_wscn_degree(degree: usize) -> usize {
    degree - degree % TILE
}

/// Parameters of the weak-strong cluster generator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WscnParams {
    /// Bias applied to weak-cluster sites.
    pub weak_field: f64,
    /// Bias applied to strong-cluster sites.
    pub strong_field: f64,
}

impl Default for WscnParams {
    fn default() -> Self {
        Self {
            weak_field: 0.44,
            strong_field: -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Strong,
    Weak,
    Idle,
}

const fn role_of(row: usize, col: usize) -> Role {
    match (row % TILE, col % TILE) {
        (1, 1) => Role::Strong,
        (0 | 2, 1) | (1, 0 | 2) => Role::Weak,
        _ => Role::Idle,
    }
}

/// Builds a weak-strong cluster network over a view whose degree is a
/// positive multiple of three. Consumes no randomness.
///
/// # Examples
/// ```
/// use bqpgen_core::{Generator, Topology, WscnGenerator, WscnParams};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let topology = Topology::synthesize_full_yield(3)?;
/// let generator = WscnGenerator::new(WscnParams::default())?;
/// let assignment = generator.generate(&topology, &mut StdRng::seed_from_u64(0))?;
/// assert_eq!(assignment.fields().len(), 40);
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct WscnGenerator {
    params: WscnParams,
}

impl WscnGenerator {
    /// Checks that both fields are finite.
    ///
    /// # Errors
    /// Returns [`BqpError::InvalidParameter`] for a non-finite field.
    pub fn new(params: WscnParams) -> Result<Self> {
        for (name, value) in [
            ("weak_field", params.weak_field),
            ("strong_field", params.strong_field),
        ] {
            if !value.is_finite() {
                return Err(BqpError::invalid_parameter(
                    name,
                    format!("must be finite (got {value})"),
                ));
            }
        }
        Ok(Self { params })
    }

    /// Validated parameters.
    #[must_use]
    pub const fn params(&self) -> &WscnParams {
        &self.params
    }

    fn check_fields(&self, topology: &Topology) -> Result<()> {
        let range = topology.site_range();
        for (name, value) in [
            ("weak_field", self.params.weak_field),
            ("strong_field", self.params.strong_field),
        ] {
            if !range.contains(value) {
                return Err(BqpError::invalid_parameter(
                    name,
                    format!(
                        "{value} lies outside the site range [{}, {}]",
                        range.low(),
                        range.high()
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Generator for WscnGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Wscn
    }

    #[instrument(name = "core.generate_wscn", err, skip_all, fields(degree = topology.degree()))]
    fn generate(&self, topology: &Topology, _rng: &mut dyn RngCore) -> Result<Assignment> {
        let degree = topology.degree();
        if degree < TILE {
            return Err(BqpError::TopologyTooSmall {
                generator: "wscn",
                required_degree: TILE,
                actual_degree: degree,
            });
        }
        if degree % TILE != 0 {
            return Err(BqpError::DegreeNotMultipleOfThree { degree });
        }
        self.check_fields(topology)?;

        let placement = |site: SiteId| {
            topology
                .coordinate(site)
                .map(|c| (role_of(c.row, c.col), c.cell()))
        };

        let mut fields = BTreeMap::new();
        for site in topology.sites() {
            match placement(*site) {
                Some((Role::Strong, _)) => {
                    fields.insert(*site, self.params.strong_field);
                }
                Some((Role::Weak, _)) => {
                    fields.insert(*site, self.params.weak_field);
                }
                Some((Role::Idle, _)) | None => {}
            }
        }

        let ferro = topology.coupler_range().low();
        let antiferro = topology.coupler_range().high();
        let mut couplings = BTreeMap::new();
        for coupler in topology.couplers() {
            let weight = match (placement(coupler.low()), placement(coupler.high())) {
                (Some((Role::Strong, a)), Some((Role::Strong, b))) if a == b => Some(ferro),
                (Some((Role::Strong, _)), Some((Role::Weak, _)))
                | (Some((Role::Weak, _)), Some((Role::Strong, _))) => Some(antiferro),
                _ => None,
            };
            if let Some(weight) = weight {
                couplings.insert(*coupler, weight);
            }
        }

        info!(
            biased_sites = fields.len(),
            weighted_couplers = couplings.len(),
            "built weak-strong cluster network"
        );
        Ok(Assignment::new(fields, couplings))
    }
}

//! Canonical export records.
//!
//! [`InstanceRecord`] follows the bqpjson layout: declared variables and
//! couplers, the spin domain, linear and quadratic terms for every non-zero
//! coefficient, and a metadata block describing how the instance was made.

mod validate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    BqpError, Result, ValueTarget,
    generators::{Assignment, GenerationReport, GeneratorKind},
    pipeline::GeneratorConfig,
    range::ValueRange,
    topology::{Coupler, SiteId, Topology},
};

/// Format version written into every record.
pub const BQP_VERSION: &str = "1.0.0";

pub(crate) const SPIN_DOMAIN: &str = "spin";

/// A non-zero site bias.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearTerm {
    /// Biased site.
    pub id: SiteId,
    /// Bias value.
    pub coeff: f64,
}

/// A non-zero coupler weight, `id_tail < id_head`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadraticTerm {
    /// Smaller endpoint.
    pub id_tail: SiteId,
    /// Larger endpoint.
    pub id_head: SiteId,
    /// Weight value.
    pub coeff: f64,
}

/// Where and when an instance was produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Generation timestamp, formatted by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
    /// Endpoint of the hardware the topology came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dw_url: Option<String>,
    /// Name of the solver the topology came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_name: Option<String>,
}

/// Description of how an instance was produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    /// Strategy that produced the coefficients.
    pub generator: GeneratorKind,
    /// Parameters passed to the strategy.
    pub parameters: GeneratorConfig,
    /// Degree of the view the coefficients were generated on.
    pub chimera_degree: usize,
    /// Seed of the random source, when one was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Generator diagnostics.
    #[serde(default, skip_serializing_if = "GenerationReport::is_empty")]
    pub report: GenerationReport,
    /// Timestamp and hardware identity.
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl InstanceMetadata {
    /// Creates metadata for `parameters` on a view of `chimera_degree`.
    #[must_use]
    pub fn new(parameters: GeneratorConfig, chimera_degree: usize) -> Self {
        Self {
            generator: parameters.kind(),
            parameters,
            chimera_degree,
            seed: None,
            report: GenerationReport::Empty,
            provenance: Provenance::default(),
        }
    }
}

/// A validated, serializable BQP instance.
///
/// Field order is the serialization order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Format version.
    pub version: String,
    /// Active sites in ascending order.
    pub variable_ids: Vec<SiteId>,
    /// Active couplers in ascending canonical order.
    pub couplers: Vec<Coupler>,
    /// Always `"spin"`.
    pub variable_domain: String,
    /// Energy scale.
    pub scale: f64,
    /// Energy offset.
    pub offset: f64,
    /// Legal site biases.
    pub site_range: ValueRange,
    /// Legal coupler weights.
    pub coupler_range: ValueRange,
    /// Non-zero site biases in ascending site order.
    pub linear_terms: Vec<LinearTerm>,
    /// Non-zero coupler weights in ascending coupler order.
    pub quadratic_terms: Vec<QuadraticTerm>,
    /// Provenance.
    pub metadata: InstanceMetadata,
}

fn check_value(target: ValueTarget, value: f64, range: &ValueRange) -> Result<()> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(BqpError::RangeViolation {
            target,
            value,
            low: range.low(),
            high: range.high(),
        })
    }
}

/// Validates coefficients against `topology` and assembles the record.
///
/// Zero coefficients are dropped from the term lists.
///
/// # Errors
/// Returns [`BqpError::UnknownSite`] or [`BqpError::UnknownCoupler`] for
/// entries the topology does not contain and [`BqpError::RangeViolation`] for
/// values outside the declared ranges, including non-finite values.
#[instrument(
    name = "core.build_record",
    err,
    skip_all,
    fields(sites = fields.len(), couplers = couplings.len())
)]
pub fn build_record(
    topology: &Topology,
    fields: &BTreeMap<SiteId, f64>,
    couplings: &BTreeMap<Coupler, f64>,
    metadata: InstanceMetadata,
) -> Result<InstanceRecord> {
    let mut linear_terms = Vec::new();
    for (site, value) in fields {
        if !topology.contains_site(*site) {
            return Err(BqpError::UnknownSite { site: *site });
        }
        check_value(ValueTarget::Site(*site), *value, topology.site_range())?;
        if *value != 0.0 {
            linear_terms.push(LinearTerm {
                id: *site,
                coeff: *value,
            });
        }
    }

    let mut quadratic_terms = Vec::new();
    for (coupler, value) in couplings {
        if !topology.contains_coupler(coupler) {
            return Err(BqpError::UnknownCoupler { coupler: *coupler });
        }
        check_value(ValueTarget::Coupler(*coupler), *value, topology.coupler_range())?;
        if *value != 0.0 {
            quadratic_terms.push(QuadraticTerm {
                id_tail: coupler.low(),
                id_head: coupler.high(),
                coeff: *value,
            });
        }
    }

    Ok(InstanceRecord {
        version: BQP_VERSION.to_owned(),
        variable_ids: topology.sites().to_vec(),
        couplers: topology.couplers().to_vec(),
        variable_domain: SPIN_DOMAIN.to_owned(),
        scale: 1.0,
        offset: 0.0,
        site_range: *topology.site_range(),
        coupler_range: *topology.coupler_range(),
        linear_terms,
        quadratic_terms,
        metadata,
    })
}

/// Builder assembling an [`InstanceRecord`] from a generator's
/// [`Assignment`].
///
/// # Examples
/// ```
/// use bqpgen_core::{
///     Generator, GeneratorConfig, InstanceBuilder, RanGenerator, RanParams, Topology,
/// };
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let topology = Topology::synthesize_full_yield(1)?;
/// let params = RanParams::default();
/// let assignment =
///     RanGenerator::new(params)?.generate(&topology, &mut StdRng::seed_from_u64(5))?;
/// let record = InstanceBuilder::new(&topology, GeneratorConfig::Ran(params))
///     .with_seed(5)
///     .build(&assignment)?;
/// assert_eq!(record.quadratic_terms.len(), 16);
/// assert_eq!(record.metadata.seed, Some(5));
/// record.validate()?;
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Debug)]
pub struct InstanceBuilder<'a> {
    topology: &'a Topology,
    metadata: InstanceMetadata,
}

impl<'a> InstanceBuilder<'a> {
    /// Starts a record for `parameters` on `topology`.
    #[must_use]
    pub fn new(topology: &'a Topology, parameters: GeneratorConfig) -> Self {
        Self {
            topology,
            metadata: InstanceMetadata::new(parameters, topology.degree()),
        }
    }

    /// Records the seed of the random source.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.metadata.seed = Some(seed);
        self
    }

    /// Records timestamp and hardware identity.
    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.metadata.provenance = provenance;
        self
    }

    /// Replaces the metadata wholesale.
    #[must_use]
    pub fn with_metadata(mut self, metadata: InstanceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validates `assignment` and assembles the record, carrying its report
    /// into the metadata.
    ///
    /// # Errors
    /// Propagates the errors of [`build_record`].
    pub fn build(self, assignment: &Assignment) -> Result<InstanceRecord> {
        let mut metadata = self.metadata;
        metadata.report = assignment.report().clone();
        build_record(
            self.topology,
            assignment.fields(),
            assignment.couplings(),
            metadata,
        )
    }
}

#[cfg(test)]
mod tests;

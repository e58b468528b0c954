//! Structural checks for records read back from storage.

use std::collections::BTreeSet;

use super::{BQP_VERSION, InstanceRecord, SPIN_DOMAIN, check_value};
use crate::{
    BqpError, Result, ValueTarget,
    topology::{Coupler, SiteId},
};

fn strictly_ascending<T: Ord>(items: impl IntoIterator<Item = T>) -> bool {
    let mut previous: Option<T> = None;
    for item in items {
        if previous.as_ref().is_some_and(|last| *last >= item) {
            return false;
        }
        previous = Some(item);
    }
    true
}

impl InstanceRecord {
    /// Re-checks a record, typically one deserialized from JSON.
    ///
    /// # Errors
    /// Returns [`BqpError::MalformedRecord`] for structural defects such as
    /// unsorted ids, an unknown version or domain, or degenerate ranges;
    /// [`BqpError::UnknownSite`] or [`BqpError::UnknownCoupler`] for terms
    /// referencing undeclared entries; and [`BqpError::RangeViolation`] for
    /// coefficients outside the declared ranges.
    pub fn validate(&self) -> Result<()> {
        if self.version != BQP_VERSION {
            return Err(BqpError::malformed(format!(
                "unsupported version `{}`",
                self.version
            )));
        }
        if self.variable_domain != SPIN_DOMAIN {
            return Err(BqpError::malformed(format!(
                "variable domain must be `{SPIN_DOMAIN}`, found `{}`",
                self.variable_domain
            )));
        }
        if !self.scale.is_finite() || !self.offset.is_finite() {
            return Err(BqpError::malformed("scale and offset must be finite"));
        }
        for range in [&self.site_range, &self.coupler_range] {
            range
                .check()
                .map_err(|err| BqpError::malformed(err.to_string()))?;
        }

        if !strictly_ascending(self.variable_ids.iter()) {
            return Err(BqpError::malformed(
                "variable ids must be sorted without duplicates",
            ));
        }
        let declared: BTreeSet<SiteId> = self.variable_ids.iter().copied().collect();
        if !strictly_ascending(self.couplers.iter()) {
            return Err(BqpError::malformed(
                "couplers must be sorted without duplicates",
            ));
        }
        if let Some(coupler) = self
            .couplers
            .iter()
            .find(|c| !declared.contains(&c.low()) || !declared.contains(&c.high()))
        {
            return Err(BqpError::malformed(format!(
                "coupler {coupler} references an undeclared variable"
            )));
        }
        let couplers: BTreeSet<Coupler> = self.couplers.iter().copied().collect();

        if !strictly_ascending(self.linear_terms.iter().map(|term| term.id)) {
            return Err(BqpError::malformed(
                "linear terms must be sorted by id without duplicates",
            ));
        }
        for term in &self.linear_terms {
            if !declared.contains(&term.id) {
                return Err(BqpError::UnknownSite { site: term.id });
            }
            check_value(ValueTarget::Site(term.id), term.coeff, &self.site_range)?;
        }

        if !strictly_ascending(
            self.quadratic_terms
                .iter()
                .map(|term| (term.id_tail, term.id_head)),
        ) {
            return Err(BqpError::malformed(
                "quadratic terms must be sorted without duplicates",
            ));
        }
        for term in &self.quadratic_terms {
            if term.id_tail >= term.id_head {
                return Err(BqpError::malformed(format!(
                    "quadratic term ({}, {}) is not in canonical order",
                    term.id_tail, term.id_head
                )));
            }
            let coupler = Coupler::between(term.id_tail, term.id_head);
            if !couplers.contains(&coupler) {
                return Err(BqpError::UnknownCoupler { coupler });
            }
            check_value(ValueTarget::Coupler(coupler), term.coeff, &self.coupler_range)?;
        }
        Ok(())
    }
}

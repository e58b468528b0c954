//! Hardware topology snapshots stored as JSON.
//!
//! A snapshot mirrors the solver properties a processor reports: active
//! `qubits`, `couplers` as id pairs, and the `h_range`/`j_range` bounds.
//! Unrelated properties are ignored.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use bqpgen_core::{BqpError, SiteId, Topology, infer_degree};
use serde::Deserialize;
use thiserror::Error;
use tracing::{instrument, warn};

/// Errors raised while reading a snapshot file.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// The snapshot could not be opened.
    #[error("failed to open hardware file `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The snapshot is not valid JSON or lacks a required property.
    #[error("hardware file `{path}` is malformed: {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Processor properties needed to build a [`Topology`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HardwareSnapshot {
    /// Active qubit ids.
    pub qubits: Vec<u32>,
    /// Working couplers as unordered id pairs.
    pub couplers: Vec<(u32, u32)>,
    /// Legal bias range.
    pub h_range: (f64, f64),
    /// Legal coupling range.
    pub j_range: (f64, f64),
}

impl HardwareSnapshot {
    /// Reads a snapshot from `path`.
    ///
    /// # Errors
    /// Returns [`HardwareError`] when the file cannot be opened or parsed.
    #[instrument(name = "cli.load_snapshot", err, skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, HardwareError> {
        let file = File::open(path).map_err(|source| HardwareError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| HardwareError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Wraps the snapshot as a topology numbered for a lattice of `degree`.
    ///
    /// Warns when the qubit count suggests a different degree. A snapshot too
    /// large for `degree` is numbered with the inferred degree instead.
    ///
    /// # Errors
    /// Propagates the validation errors of [`Topology::from_hardware`].
    pub fn into_topology(self, degree: usize) -> Result<Topology, BqpError> {
        let inferred = infer_degree(self.qubits.len());
        let numbering = degree.max(inferred);
        if inferred != degree {
            warn!(
                declared = degree,
                inferred,
                numbering, "hardware degree disagrees with the snapshot's qubit count"
            );
        }
        Topology::from_hardware(
            self.qubits.into_iter().map(SiteId::new),
            self.couplers
                .into_iter()
                .map(|(a, b)| (SiteId::new(a), SiteId::new(b))),
            numbering,
            self.h_range,
            self.j_range,
        )
    }
}

//! Benchmark support crate for bqpgen.
//!
//! Provides seeded damaged lattices and parameter labels used by the
//! Criterion benchmarks for topology construction and the four generators.

pub mod error;
pub mod hardware;
pub mod params;

//! Topology construction benchmarks.
//!
//! Measures full-yield synthesis, wrapping a damaged hardware snapshot and
//! filtering down to a smaller lattice.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use bqpgen_benches::{
    error::BenchSetupError,
    hardware::{HardwareConfig, damaged_lattice},
    params::TopologyBenchParams,
};
use bqpgen_core::Topology;

/// Seed used for every damaged lattice.
const SEED: u64 = 42;

/// Lattice sizes to benchmark.
const DEGREES: &[usize] = &[4, 8, 12, 16];

/// Broken qubits per thousand, roughly a production chip.
const BROKEN_PER_MILLE: u32 = 30;

fn synthesize_full_yield(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize_full_yield");
    group.sample_size(20);
    for &degree in DEGREES {
        let params = TopologyBenchParams {
            degree,
            broken_per_mille: 0,
        };
        group.bench_with_input(BenchmarkId::from_parameter(&params), &degree, |b, &degree| {
            b.iter(|| Topology::synthesize_full_yield(degree));
        });
    }
    group.finish();
}

fn filter_to_degree_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("filter_to_degree");
    group.sample_size(20);
    for &degree in DEGREES {
        let hardware = damaged_lattice(&HardwareConfig {
            degree,
            broken_per_mille: BROKEN_PER_MILLE,
            seed: SEED,
        })?;
        let params = TopologyBenchParams {
            degree,
            broken_per_mille: BROKEN_PER_MILLE,
        };
        let target = degree.div_ceil(2);
        group.bench_with_input(
            BenchmarkId::from_parameter(&params),
            &(hardware, target),
            |b, (hardware, target)| {
                b.iter(|| hardware.filter_to_degree(*target));
            },
        );
    }
    group.finish();
    Ok(())
}

fn filter_to_degree(c: &mut Criterion) {
    if let Err(err) = filter_to_degree_impl(c) {
        panic!("filter_to_degree benchmark setup failed: {err}");
    }
}

criterion_group!(benches, synthesize_full_yield, filter_to_degree);
criterion_main!(benches);

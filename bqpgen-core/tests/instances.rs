//! End-to-end generation through the seeded pipeline.

mod common;

use bqpgen_core::{
    BqpError, ErrorKind, FlParams, GenerationReport, GeneratorConfig, InstanceRecord,
    Provenance, RanParams, SiteId, Topology, WscnParams, generate_instance,
};
use rstest::rstest;

use common::full;

fn json(topology: &Topology, config: GeneratorConfig, seed: u64) -> String {
    let record = generate_instance(topology, &config, seed, Provenance::default())
        .expect("generation must succeed");
    serde_json::to_string_pretty(&record).expect("serialize")
}

#[rstest]
#[case::ran(GeneratorConfig::Ran(RanParams { steps: 3, field: true }), 2)]
#[case::clq(GeneratorConfig::Clq, 2)]
#[case::fl(GeneratorConfig::Fl(FlParams::default()), 2)]
#[case::wscn(GeneratorConfig::Wscn(WscnParams::default()), 3)]
fn identical_seeds_give_identical_bytes(#[case] config: GeneratorConfig, #[case] degree: usize) {
    let topology = full(degree);
    let first = json(&topology, config, 17);
    let second = json(&topology, config, 17);
    assert_eq!(first, second);

    let record: InstanceRecord = serde_json::from_str(&first).expect("deserialize");
    record.validate().expect("generated records are valid");
    assert_eq!(record.metadata.seed, Some(17));
    assert_eq!(record.metadata.parameters, config);
}

#[test]
fn different_seeds_give_different_ran_instances() {
    let topology = full(2);
    let config = GeneratorConfig::Ran(RanParams {
        steps: 3,
        field: false,
    });
    assert_ne!(json(&topology, config, 1), json(&topology, config, 2));
}

#[test]
fn frustrated_loops_reach_the_target_on_degree_two() {
    let topology = full(2);
    let record = generate_instance(
        &topology,
        &GeneratorConfig::Fl(FlParams::default()),
        0,
        Provenance::default(),
    )
    .expect("fl must succeed");
    record.validate().expect("record is valid");
    assert!(!record.quadratic_terms.is_empty());
    assert!(record.linear_terms.is_empty());
    let GenerationReport::Loops(report) = &record.metadata.report else {
        panic!("loop report expected, got {:?}", record.metadata.report);
    };
    assert!((report.target_length - 6.4).abs() < 1e-12);
    assert!(report.accepted_length >= 8);
    assert_eq!(report.exhausted, None);
}

#[test]
fn clq_records_keep_every_site_declared() {
    let topology = full(2);
    let record = generate_instance(&topology, &GeneratorConfig::Clq, 0, Provenance::default())
        .expect("clique must embed");
    assert_eq!(record.variable_ids.len(), 32);
    assert_eq!(record.couplers.len(), 80);
    // 8 chains of 3 sites, 2 couplers each, plus C(8, 2) crossings and one
    // extra crossing per same-block pair.
    assert_eq!(record.quadratic_terms.len(), 16 + 28 + 12);
    assert_eq!(record.variable_ids.first(), Some(&SiteId::new(0)));
}

#[test]
fn hardware_ranges_flow_into_the_record() {
    let lattice = full(1);
    let couplers: Vec<(SiteId, SiteId)> = lattice
        .couplers()
        .iter()
        .map(|c| (c.low(), c.high()))
        .collect();
    let topology = Topology::from_hardware(
        lattice.sites().iter().copied(),
        couplers,
        1,
        (-4.0, 4.0),
        (-2.0, 1.0),
    )
    .expect("hardware must wrap");
    let config = GeneratorConfig::Ran(RanParams {
        steps: 1,
        field: true,
    });
    let record = generate_instance(&topology, &config, 5, Provenance::default())
        .expect("ran must succeed");
    assert_eq!(record.coupler_range.low(), -2.0);
    // The symmetric bound is the smaller magnitude of the two ends.
    assert!(record.quadratic_terms.iter().all(|t| t.coeff.abs() == 1.0));
    assert!(record.linear_terms.iter().all(|t| t.coeff.abs() == 4.0));
}

#[test]
fn one_sided_ranges_cannot_host_signed_weights() {
    let lattice = full(1);
    let couplers: Vec<(SiteId, SiteId)> = lattice
        .couplers()
        .iter()
        .map(|c| (c.low(), c.high()))
        .collect();
    let topology = Topology::from_hardware(
        lattice.sites().iter().copied(),
        couplers,
        1,
        (-2.0, 2.0),
        (0.0, 1.0),
    )
    .expect("hardware must wrap");
    let err = generate_instance(
        &topology,
        &GeneratorConfig::Ran(RanParams::default()),
        0,
        Provenance::default(),
    )
    .expect_err("a [0, 1] coupler range has no negative side");
    assert!(matches!(err, BqpError::InvalidParameter { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

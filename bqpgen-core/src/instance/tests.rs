//! Unit tests for record assembly and validation.

use super::*;

use rstest::{fixture, rstest};

use crate::generators::{FlParams, RanParams};

#[fixture]
fn cell() -> Topology {
    Topology::synthesize_full_yield(1).expect("single cell must build")
}

fn site(id: u32) -> SiteId {
    SiteId::new(id)
}

fn coupler(a: u32, b: u32) -> Coupler {
    Coupler::between(site(a), site(b))
}

fn metadata() -> InstanceMetadata {
    InstanceMetadata::new(GeneratorConfig::Clq, 1)
}

fn sample_record(topology: &Topology) -> InstanceRecord {
    let fields = BTreeMap::from([(site(0), 0.5), (site(5), 0.0)]);
    let couplings = BTreeMap::from([(coupler(0, 4), -1.0), (coupler(1, 7), 0.25)]);
    build_record(topology, &fields, &couplings, metadata()).expect("record must build")
}

#[rstest]
fn records_list_declared_entries_and_non_zero_terms(cell: Topology) {
    let record = sample_record(&cell);
    assert_eq!(record.version, BQP_VERSION);
    assert_eq!(record.variable_domain, "spin");
    assert_eq!(record.variable_ids.len(), 8);
    assert_eq!(record.couplers.len(), 16);
    assert_eq!(
        record.linear_terms,
        vec![LinearTerm {
            id: site(0),
            coeff: 0.5
        }]
    );
    assert_eq!(
        record.quadratic_terms,
        vec![
            QuadraticTerm {
                id_tail: site(0),
                id_head: site(4),
                coeff: -1.0
            },
            QuadraticTerm {
                id_tail: site(1),
                id_head: site(7),
                coeff: 0.25
            },
        ]
    );
    record.validate().expect("fresh records are valid");
}

#[rstest]
#[case::above(1.5)]
#[case::below(-1.000_001)]
#[case::nan(f64::NAN)]
fn out_of_range_weights_name_the_coupler(cell: Topology, #[case] value: f64) {
    let couplings = BTreeMap::from([(coupler(2, 6), value)]);
    let err = build_record(&cell, &BTreeMap::new(), &couplings, metadata())
        .expect_err("value must be rejected");
    match err {
        BqpError::RangeViolation { target, low, high, .. } => {
            assert_eq!(target, ValueTarget::Coupler(coupler(2, 6)));
            assert_eq!((low, high), (-1.0, 1.0));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn boundary_values_are_accepted(cell: Topology) {
    let fields = BTreeMap::from([(site(1), -2.0), (site(2), 2.0)]);
    let couplings = BTreeMap::from([(coupler(0, 4), -1.0), (coupler(0, 5), 1.0)]);
    assert!(build_record(&cell, &fields, &couplings, metadata()).is_ok());
}

#[rstest]
fn unknown_entries_are_rejected(cell: Topology) {
    let fields = BTreeMap::from([(site(8), 0.5)]);
    let err = build_record(&cell, &fields, &BTreeMap::new(), metadata())
        .expect_err("site 8 is not active");
    assert_eq!(err, BqpError::UnknownSite { site: site(8) });

    let couplings = BTreeMap::from([(coupler(0, 1), 0.5)]);
    let err = build_record(&cell, &BTreeMap::new(), &couplings, metadata())
        .expect_err("vertical qubits are not coupled inside a cell");
    assert_eq!(err, BqpError::UnknownCoupler { coupler: coupler(0, 1) });
    assert_eq!(err.kind(), crate::ErrorKind::Validation);
}

#[rstest]
fn builder_carries_seed_provenance_and_report(cell: Topology) {
    let assignment = Assignment::new(BTreeMap::new(), BTreeMap::from([(coupler(0, 4), 1.0)]))
        .with_report(GenerationReport::Clique(crate::CliqueReport {
            logical_nodes: 4,
            chain_length: 2,
        }));
    let provenance = Provenance {
        generated: Some("2024-01-01T00:00:00Z".to_owned()),
        dw_url: None,
        solver_name: Some("offline".to_owned()),
    };
    let record = InstanceBuilder::new(&cell, GeneratorConfig::Clq)
        .with_seed(42)
        .with_provenance(provenance.clone())
        .build(&assignment)
        .expect("record must build");
    assert_eq!(record.metadata.generator, GeneratorKind::Clq);
    assert_eq!(record.metadata.seed, Some(42));
    assert_eq!(record.metadata.provenance, provenance);
    assert!(matches!(record.metadata.report, GenerationReport::Clique(_)));
}

#[rstest]
fn metadata_flattens_provenance_and_skips_absent_values(cell: Topology) {
    let mut record = sample_record(&cell);
    record.metadata.provenance.dw_url = Some("https://example.invalid/sapi".to_owned());
    let json = serde_json::to_value(&record).expect("serialize");
    let metadata = &json["metadata"];
    assert_eq!(metadata["generator"], "clq");
    assert_eq!(metadata["parameters"]["generator"], "clq");
    assert_eq!(metadata["dw_url"], "https://example.invalid/sapi");
    assert!(metadata.get("seed").is_none());
    assert!(metadata.get("report").is_none());
    assert!(metadata.get("solver_name").is_none());
}

#[rstest]
fn records_round_trip_through_json(cell: Topology) {
    let mut record = sample_record(&cell);
    record.metadata = InstanceMetadata::new(
        GeneratorConfig::Fl(FlParams {
            alpha: 0.1 + 0.2,
            ..FlParams::default()
        }),
        1,
    );
    record.linear_terms[0].coeff = 1.0 / 3.0;
    let json = serde_json::to_string_pretty(&record).expect("serialize");
    let back: InstanceRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, record);
    back.validate().expect("round-tripped record is valid");
}

#[rstest]
fn serialization_keeps_field_order(cell: Topology) {
    let json = serde_json::to_string(&sample_record(&cell)).expect("serialize");
    let keys = [
        "\"version\"",
        "\"variable_ids\"",
        "\"couplers\"",
        "\"variable_domain\"",
        "\"scale\"",
        "\"offset\"",
        "\"site_range\"",
        "\"coupler_range\"",
        "\"linear_terms\"",
        "\"quadratic_terms\"",
        "\"metadata\"",
    ];
    let positions: Vec<usize> = keys
        .iter()
        .map(|key| json.find(key).expect("key must be present"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

type Tamper = fn(&mut InstanceRecord);

#[rstest]
#[case::domain(|r: &mut InstanceRecord| r.variable_domain = "boolean".to_owned(), "BQP_MALFORMED_RECORD")]
#[case::version(|r: &mut InstanceRecord| r.version = "0.1".to_owned(), "BQP_MALFORMED_RECORD")]
#[case::unsorted_ids(|r: &mut InstanceRecord| r.variable_ids.swap(0, 1), "BQP_MALFORMED_RECORD")]
#[case::unsorted_couplers(|r: &mut InstanceRecord| r.couplers.swap(0, 1), "BQP_MALFORMED_RECORD")]
#[case::undeclared_site(|r: &mut InstanceRecord| r.linear_terms[0].id = SiteId::new(99), "BQP_UNKNOWN_SITE")]
#[case::reversed_term(
    |r: &mut InstanceRecord| {
        let term = &mut r.quadratic_terms[0];
        std::mem::swap(&mut term.id_tail, &mut term.id_head);
    },
    "BQP_MALFORMED_RECORD"
)]
#[case::undeclared_coupler(|r: &mut InstanceRecord| r.quadratic_terms[1].id_head = SiteId::new(2), "BQP_UNKNOWN_COUPLER")]
#[case::range(|r: &mut InstanceRecord| r.quadratic_terms[0].coeff = -1.5, "BQP_RANGE_VIOLATION")]
#[case::narrowed_range(
    |r: &mut InstanceRecord| r.site_range = ValueRange::new(-0.25, 0.25).expect("valid range"),
    "BQP_RANGE_VIOLATION"
)]
#[case::degenerate_range(
    |r: &mut InstanceRecord| r.coupler_range = serde_json::from_str(r#"{"low": 1.0, "high": -1.0}"#).expect("plain pair"),
    "BQP_MALFORMED_RECORD"
)]
fn tampered_records_fail_validation(cell: Topology, #[case] tamper: Tamper, #[case] code: &str) {
    let mut record = sample_record(&cell);
    tamper(&mut record);
    let err = record.validate().expect_err("tampered record must fail");
    assert_eq!(err.code().as_str(), code);
}

#[rstest]
fn ran_metadata_records_parameters(cell: Topology) {
    let params = RanParams {
        steps: 3,
        field: true,
    };
    let record = InstanceBuilder::new(&cell, GeneratorConfig::Ran(params))
        .build(&Assignment::default())
        .expect("empty assignments build");
    assert_eq!(record.metadata.parameters, GeneratorConfig::Ran(params));
    assert!(record.linear_terms.is_empty());
}

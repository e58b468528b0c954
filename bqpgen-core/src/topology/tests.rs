//! Unit tests for topology construction, validation and filtering.

use super::*;

use rstest::{fixture, rstest};

#[fixture]
fn degree_two() -> Topology {
    Topology::synthesize_full_yield(2).expect("degree 2 lattice must build")
}

fn ids(raw: &[u32]) -> Vec<SiteId> {
    raw.iter().copied().map(SiteId::new).collect()
}

fn pair(a: u32, b: u32) -> (SiteId, SiteId) {
    (SiteId::new(a), SiteId::new(b))
}

#[rstest]
fn full_yield_lattice_has_expected_shape(degree_two: Topology) {
    assert_eq!(degree_two.degree(), 2);
    assert_eq!(degree_two.hardware_degree(), 2);
    assert_eq!(degree_two.sites().len(), 32);
    assert_eq!(degree_two.couplers().len(), 80);
    assert!(degree_two.sites().windows(2).all(|w| w[0] < w[1]));
    assert!(degree_two.couplers().windows(2).all(|w| w[0] < w[1]));
    assert_eq!(degree_two.site_range(), &ValueRange::DEFAULT_SITE);
    assert_eq!(degree_two.coupler_range(), &ValueRange::DEFAULT_COUPLER);
}

#[rstest]
#[case::corner_vertical(0, &[4, 5, 6, 7, 16])]
#[case::corner_horizontal(4, &[0, 1, 2, 3, 12])]
#[case::far_corner_vertical(24, &[8, 28, 29, 30, 31])]
fn neighbours_follow_the_unit_cell_rule(
    degree_two: Topology,
    #[case] site: u32,
    #[case] expected: &[u32],
) {
    assert_eq!(degree_two.neighbours(SiteId::new(site)), ids(expected).as_slice());
}

#[rstest]
fn neighbours_of_inactive_sites_are_empty(degree_two: Topology) {
    assert!(degree_two.neighbours(SiteId::new(500)).is_empty());
}

#[test]
fn zero_degree_is_rejected() {
    let err = Topology::synthesize_full_yield(0).expect_err("degree 0 must fail");
    assert!(matches!(err, BqpError::InvalidParameter { parameter: "degree", .. }));
}

#[test]
fn hardware_couplers_are_canonicalized() {
    let topology = Topology::from_hardware(
        ids(&[0, 4, 5]),
        vec![pair(4, 0), pair(0, 5)],
        1,
        (-2.0, 2.0),
        (-1.0, 1.0),
    )
    .expect("hardware topology must build");
    let couplers: Vec<(u32, u32)> = topology
        .couplers()
        .iter()
        .map(|c| (c.low().get(), c.high().get()))
        .collect();
    assert_eq!(couplers, vec![(0, 4), (0, 5)]);
}

#[rstest]
#[case::self_loop(vec![pair(4, 4)], "BQP_SELF_LOOP")]
#[case::reversed_duplicate(vec![pair(0, 4), pair(4, 0)], "BQP_DUPLICATE_COUPLER")]
#[case::inactive_endpoint(vec![pair(0, 6)], "BQP_UNKNOWN_ENDPOINT")]
fn invalid_hardware_couplers_are_rejected(
    #[case] couplers: Vec<(SiteId, SiteId)>,
    #[case] code: &str,
) {
    let err = Topology::from_hardware(ids(&[0, 4, 5]), couplers, 1, (-2.0, 2.0), (-1.0, 1.0))
        .expect_err("topology must be rejected");
    assert_eq!(err.code().as_str(), code);
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
}

#[test]
fn sites_outside_the_lattice_are_rejected() {
    let err = Topology::from_hardware(ids(&[0, 8]), Vec::new(), 1, (-2.0, 2.0), (-1.0, 1.0))
        .expect_err("site 8 does not exist in a single cell");
    assert_eq!(
        err,
        BqpError::SiteOutsideLattice {
            site: SiteId::new(8),
            degree: 1
        }
    );
}

#[rstest]
#[case((1.0, -1.0), (-1.0, 1.0), "site_range")]
#[case((-2.0, 2.0), (0.5, 0.5), "coupler_range")]
fn degenerate_hardware_ranges_are_rejected(
    #[case] site_range: (f64, f64),
    #[case] coupler_range: (f64, f64),
    #[case] expected: &str,
) {
    let err = Topology::from_hardware(ids(&[0]), Vec::new(), 1, site_range, coupler_range)
        .expect_err("range must be rejected");
    match err {
        BqpError::DegenerateRange { name, .. } => assert_eq!(name, expected),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn filtering_keeps_the_top_left_block(degree_two: Topology) {
    let filtered = degree_two.filter_to_degree(1).expect("filter must succeed");
    assert_eq!(filtered.degree(), 1);
    assert_eq!(filtered.hardware_degree(), 2);
    assert_eq!(filtered.sites(), ids(&[0, 1, 2, 3, 4, 5, 6, 7]).as_slice());
    assert_eq!(filtered.couplers().len(), 16);
    assert!(
        filtered
            .couplers()
            .iter()
            .all(|coupler| degree_two.contains_coupler(coupler))
    );
}

#[rstest]
fn filtering_to_the_current_degree_is_a_no_op(degree_two: Topology) {
    let same = degree_two.filter_to_degree(2).expect("filter must succeed");
    assert_eq!(same, degree_two);
    let once = degree_two.filter_to_degree(1).expect("filter must succeed");
    let twice = once.filter_to_degree(1).expect("filter must succeed");
    assert_eq!(once, twice);
}

#[rstest]
fn filtering_beyond_the_degree_fails(degree_two: Topology) {
    let err = degree_two.filter_to_degree(3).expect_err("degree 3 must fail");
    assert_eq!(
        err,
        BqpError::DegreeExceeded {
            requested: 3,
            available: 2
        }
    );
}

#[rstest]
fn site_lookup_respects_the_view(degree_two: Topology) {
    let filtered = degree_two.filter_to_degree(1).expect("filter must succeed");
    let outside = ChimeraCoordinate::new(1, 1, Shore::Vertical, 0);
    assert_eq!(degree_two.site_at(outside), Some(SiteId::new(24)));
    assert_eq!(filtered.site_at(outside), None);
    assert_eq!(
        degree_two.coupler_between(SiteId::new(24), SiteId::new(28)),
        Coupler::new(SiteId::new(24), SiteId::new(28)).ok()
    );
    assert_eq!(degree_two.coupler_between(SiteId::new(0), SiteId::new(1)), None);
}

#[rstest]
#[case(0, 0)]
#[case(8, 1)]
#[case(9, 2)]
#[case(32, 2)]
#[case(2048, 16)]
fn infer_degree_rounds_up(#[case] sites: usize, #[case] expected: usize) {
    assert_eq!(infer_degree(sites), expected);
}

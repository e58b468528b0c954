//! Unit tests for random walks and sampling budgets.

use super::*;

use rand::{SeedableRng, rngs::StdRng};
use rstest::{fixture, rstest};

#[fixture]
fn cell() -> Topology {
    Topology::synthesize_full_yield(1).expect("single cell must build")
}

fn budget(target: f64, reject_limit: usize, sample_limit: usize) -> SamplingBudget {
    SamplingBudget::new(target, reject_limit, sample_limit).expect("budget must be valid")
}

#[rstest]
fn closed_walks_follow_couplers(cell: Topology) {
    let sampler = LoopSampler::new(&cell);
    let mut rng = StdRng::seed_from_u64(11);
    let mut closed = 0;
    for _ in 0..200 {
        if let WalkOutcome::Closed(cycle) = sampler.sample_walk(&mut rng) {
            closed += 1;
            assert!(cycle.len() >= 4, "bipartite cells have no triangles");
            assert_eq!(cycle.len() % 2, 0);
            assert_eq!(cycle.couplers().count(), cycle.len());
            assert!(cycle.couplers().all(|coupler| cell.contains_coupler(&coupler)));
            let unique: HashSet<_> = cycle.sites().iter().collect();
            assert_eq!(unique.len(), cycle.len());
        }
    }
    assert!(closed > 0, "a complete bipartite cell closes walks often");
}

#[rstest]
fn walks_are_reproducible(cell: Topology) {
    let sampler = LoopSampler::new(&cell);
    let mut left = StdRng::seed_from_u64(3);
    let mut right = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        assert_eq!(sampler.sample_walk(&mut left), sampler.sample_walk(&mut right));
    }
}

#[test]
fn isolated_sites_dead_end_immediately() {
    let lonely = Topology::from_hardware(
        [SiteId::new(0)],
        Vec::new(),
        1,
        (-2.0, 2.0),
        (-1.0, 1.0),
    )
    .expect("single site topology must build");
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        LoopSampler::new(&lonely).sample_walk(&mut rng),
        WalkOutcome::DeadEnd { length: 0 }
    );
}

#[test]
fn paths_without_cycles_never_close() {
    let sites = [0, 4, 1].map(SiteId::new);
    let path = Topology::from_hardware(
        sites,
        [(sites[0], sites[1]), (sites[1], sites[2])],
        1,
        (-2.0, 2.0),
        (-1.0, 1.0),
    )
    .expect("path topology must build");
    let sampler = LoopSampler::new(&path);
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        assert!(matches!(
            sampler.sample_walk(&mut rng),
            WalkOutcome::DeadEnd { length } if length <= 2
        ));
    }
}

#[test]
fn loop_couplers_include_the_closing_edge() {
    let cycle = Loop::from_sites([0, 4, 1, 5].map(SiteId::new).to_vec());
    let pairs: Vec<(u32, u32)> = cycle
        .couplers()
        .map(|c| (c.low().get(), c.high().get()))
        .collect();
    assert_eq!(pairs, vec![(0, 4), (1, 4), (1, 5), (0, 5)]);
}

#[rstest]
#[case(f64::NAN, 1, 1, "target_length")]
#[case(-1.0, 1, 1, "target_length")]
#[case(1.0, 0, 1, "loop_reject_limit")]
#[case(1.0, 1, 0, "loop_sample_limit")]
fn invalid_budgets_are_rejected(
    #[case] target: f64,
    #[case] reject_limit: usize,
    #[case] sample_limit: usize,
    #[case] expected: &str,
) {
    let err = SamplingBudget::new(target, reject_limit, sample_limit)
        .expect_err("budget must be rejected");
    match err {
        crate::BqpError::InvalidParameter { parameter, .. } => assert_eq!(parameter, expected),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn zero_target_completes_without_sampling() {
    let session = SamplingSession::new(budget(0.0, 1, 1));
    assert_eq!(session.state(), SamplerState::Complete);
    assert_eq!(session.report().samples, 0);
}

#[test]
fn accepting_enough_length_completes() {
    let mut session = SamplingSession::new(budget(6.4, 10, 10));
    session.accept(4);
    assert_eq!(session.advance(), SamplerState::Sampling);
    session.accept(4);
    assert_eq!(session.advance(), SamplerState::Complete);
    let report = session.report();
    assert_eq!(report.accepted_length, 8);
    assert_eq!(report.accepted_loops, 2);
    assert_eq!(report.shortfall(), None);
}

#[test]
fn consecutive_counting_resets_on_accept() {
    let mut session = SamplingSession::new(budget(100.0, 2, 100));
    session.reject();
    assert_eq!(session.advance(), SamplerState::Sampling);
    session.accept(8);
    assert_eq!(session.advance(), SamplerState::Sampling);
    session.reject();
    assert_eq!(session.advance(), SamplerState::Sampling);
    session.reject();
    assert_eq!(
        session.advance(),
        SamplerState::BudgetExhausted(BudgetLimit::Rejections)
    );
    assert_eq!(session.report().rejections, 3);
}

#[test]
fn cumulative_counting_never_resets() {
    let counting = budget(100.0, 2, 100).with_reject_counting(RejectCounting::Cumulative);
    let mut session = SamplingSession::new(counting);
    session.reject();
    session.advance();
    session.accept(8);
    session.advance();
    session.reject();
    assert_eq!(
        session.advance(),
        SamplerState::BudgetExhausted(BudgetLimit::Rejections)
    );
}

/// Documents the assumed precedence between the two budgets: when the last
/// sample trips both, the rejection budget is reported.
#[test]
fn rejection_budget_wins_when_both_trip_together() {
    let mut session = SamplingSession::new(budget(100.0, 3, 3));
    for _ in 0..3 {
        session.reject();
        session.advance();
    }
    assert_eq!(
        session.state(),
        SamplerState::BudgetExhausted(BudgetLimit::Rejections)
    );
}

#[test]
fn reaching_the_target_beats_an_exhausted_sample_budget() {
    let mut session = SamplingSession::new(budget(8.0, 5, 1));
    session.accept(8);
    assert_eq!(session.advance(), SamplerState::Complete);
}

#[test]
fn sample_budget_stops_accepting_sessions() {
    let mut session = SamplingSession::new(budget(100.0, 5, 2));
    session.accept(8);
    session.advance();
    session.accept(8);
    assert_eq!(
        session.advance(),
        SamplerState::BudgetExhausted(BudgetLimit::Samples)
    );
    let shortfall = session.report().shortfall().expect("target was missed");
    assert_eq!(shortfall.achieved_length, 16);
    assert_eq!(shortfall.accepted_loops, 2);
    assert_eq!(shortfall.limit, BudgetLimit::Samples);
}

#[test]
fn terminal_sessions_ignore_further_verdicts() {
    let mut session = SamplingSession::new(budget(4.0, 1, 10));
    session.accept(4);
    assert!(session.advance().is_terminal());
    session.accept(4);
    session.reject();
    assert_eq!(session.advance(), SamplerState::Complete);
    assert_eq!(session.report().samples, 1);
}

#[test]
fn budget_limits_serialize_in_snake_case() {
    let json = serde_json::to_string(&BudgetLimit::Rejections).expect("serialize");
    assert_eq!(json, "\"rejections\"");
    let counting: RejectCounting = serde_json::from_str("\"cumulative\"").expect("deserialize");
    assert_eq!(counting, RejectCounting::Cumulative);
}

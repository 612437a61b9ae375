//! Property-based checks for the quantified invariants named across the
//! scoring, pulse, and solver modules.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use fitpulse::domain::{GroupSize, Intensity, Opportunity, User};
use fitpulse::features::interest_jaccard;
use fitpulse::pulse::{self, DemandState, PULSE_HISTORY_CAP};
use fitpulse::scoring::ScoreMatrix;
use fitpulse::solver;

fn tag_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-e]{1,4}", 0..6)
}

fn user_with_interests(interests: Vec<String>) -> User {
    User {
        id: "u0".into(),
        interests: interests.into_iter().collect(),
        lat: 0.0,
        lng: 0.0,
        max_travel_mins: 30,
        availability: BTreeSet::new(),
        group_pref: GroupSize::Small,
        intensity_pref: Intensity::Med,
        goal: None,
        cohort: None,
    }
}

fn opp_with_tags(tags: Vec<String>) -> Opportunity {
    Opportunity {
        id: "o0".into(),
        title: String::new(),
        description: String::new(),
        tags,
        category: String::new(),
        time_bucket: "weeknights".into(),
        starts_at: None,
        lat: 0.0,
        lng: 0.0,
        capacity: 10,
        group_size: GroupSize::Small,
        intensity: Intensity::Med,
        beginner_friendly: true,
    }
}

proptest! {
    /// Jaccard over tag sets is always within `[0, 1]`, and coincides with
    /// the identical-set case when the user's interests and the opp's
    /// tags are the same set mod case.
    #[test]
    fn jaccard_is_bounded_in_unit_interval(interests in tag_strategy(), tags in tag_strategy()) {
        let user = user_with_interests(interests);
        let opp = opp_with_tags(tags);
        let j = interest_jaccard(&user, &opp);
        prop_assert!((0.0..=1.0).contains(&j));
    }

    #[test]
    fn jaccard_of_identical_tag_sets_is_one_unless_both_empty(tags in tag_strategy()) {
        let user = user_with_interests(tags.clone());
        let opp = opp_with_tags(tags.clone());
        let j = interest_jaccard(&user, &opp);
        if tags.is_empty() {
            prop_assert_eq!(j, 0.0);
        } else {
            prop_assert!((j - 1.0).abs() < 1e-9);
        }
    }

    /// `pulse_from_demand` is always bounded in `[0, 100]` regardless of
    /// how extreme net demand or liquidity get.
    #[test]
    fn pulse_is_always_bounded(net in -10000.0f64..10000.0, liquidity in 0.01f64..1000.0) {
        let p = pulse::pulse_from_demand(net, liquidity);
        prop_assert!((0.0..=100.0).contains(&p));
    }

    /// Pulse is strictly increasing in net demand for any fixed positive
    /// liquidity.
    #[test]
    fn pulse_is_monotonic_in_net_demand(liquidity in 1.0f64..500.0, a in -500.0f64..500.0, b in -500.0f64..500.0) {
        prop_assume!(a < b);
        let pa = pulse::pulse_from_demand(a, liquidity);
        let pb = pulse::pulse_from_demand(b, liquidity);
        prop_assert!(pb > pa);
    }

    /// Decay always moves net demand toward zero (never away from it)
    /// for any nonnegative elapsed time.
    #[test]
    fn decay_never_increases_magnitude_of_net_demand(
        start in -50.0f64..50.0,
        tau_hours in 0.5f64..48.0,
        elapsed_ms in 0u64..(72 * 3600 * 1000),
    ) {
        let mut state = DemandState { net_demand: start, last_demand_ts_ms: Some(0) };
        state.apply_delta(0.0, tau_hours, elapsed_ms);
        prop_assert!(state.net_demand.abs() <= start.abs() + 1e-9);
    }

    /// Pulse history never grows past its cap no matter how many entries
    /// are pushed.
    #[test]
    fn pulse_history_never_exceeds_cap(n in 0usize..200) {
        let mut history = Vec::new();
        for i in 0..n {
            pulse::push_history(&mut history, (format!("t{i}"), i as f64));
        }
        prop_assert!(history.len() <= PULSE_HISTORY_CAP);
    }

    /// For any feasible score matrix and capacity map, the solver's
    /// assigned + unassigned sets partition exactly the input user list,
    /// and no opp's assigned count ever exceeds its capacity.
    #[test]
    fn solver_partitions_users_and_respects_capacity(
        num_users in 1usize..8,
        num_opps in 1usize..4,
        caps in prop::collection::vec(0u32..4, 1..4),
    ) {
        let user_ids: Vec<String> = (0..num_users).map(|i| format!("u{i}")).collect();
        let opp_ids: Vec<String> = (0..num_opps).map(|i| format!("o{i}")).collect();

        let mut capacities: BTreeMap<String, u32> = BTreeMap::new();
        for (i, opp_id) in opp_ids.iter().enumerate() {
            capacities.insert(opp_id.clone(), caps.get(i).copied().unwrap_or(1));
        }

        let mut matrix: ScoreMatrix = BTreeMap::new();
        for (ui, user_id) in user_ids.iter().enumerate() {
            let row = matrix.entry(user_id.clone()).or_default();
            for (oi, opp_id) in opp_ids.iter().enumerate() {
                row.insert(opp_id.clone(), ((ui + oi) % 5) as f64 / 5.0);
            }
        }

        let result = solver::solve(&user_ids, &matrix, &capacities);

        let assigned: BTreeSet<&str> = result.assignments.iter().map(|(u, _)| u.as_str()).collect();
        let unassigned: BTreeSet<&str> = result.unassigned.iter().map(|s| s.as_str()).collect();
        prop_assert!(assigned.is_disjoint(&unassigned));

        let all: BTreeSet<&str> = user_ids.iter().map(|s| s.as_str()).collect();
        let covered: BTreeSet<&str> = assigned.union(&unassigned).cloned().collect();
        prop_assert_eq!(covered, all);

        let mut used: BTreeMap<&str, u32> = BTreeMap::new();
        for (_, opp_id) in &result.assignments {
            *used.entry(opp_id.as_str()).or_insert(0) += 1;
        }
        for (opp_id, cap) in &capacities {
            let u = used.get(opp_id.as_str()).copied().unwrap_or(0);
            prop_assert!(u <= *cap);
        }
    }
}

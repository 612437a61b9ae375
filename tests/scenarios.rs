//! End-to-end scenarios exercised through `Engine`, one file per theme
//! in the teacher's `tests/*.rs` convention.

use std::collections::BTreeSet;

use fitpulse::domain::{FeedbackEvent, Goal, GroupSize, Intensity, Opportunity, User};
use fitpulse::engine::RsvpOutcome;
use fitpulse::solver::AssignmentStrategy;
use fitpulse::{Config, Engine};

fn test_engine() -> Engine {
    Engine::new(Config::from_env())
}

fn user(id: &str) -> User {
    User {
        id: id.into(),
        interests: BTreeSet::new(),
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

fn opp(id: &str, capacity: u32) -> Opportunity {
    Opportunity {
        id: id.into(),
        title: format!("Event {id}"),
        description: String::new(),
        tags: vec![],
        category: "social".into(),
        time_bucket: "weeknights".into(),
        starts_at: None,
        lat: 0.0,
        lng: 0.0,
        capacity,
        group_size: GroupSize::Small,
        intensity: Intensity::Med,
        beginner_friendly: true,
    }
}

/// Scenario A: a small balanced population solves cleanly, every user
/// lands in exactly one of assigned/unassigned, and assignments never
/// exceed the opp's capacity.
#[test]
fn scenario_a_happy_path_assignment() {
    let engine = test_engine();
    let seed = engine.seed_synthetic(12, 4);
    let result = engine.solve(None, false, None, 3).unwrap();

    assert_eq!(
        result.assignments.len() + result.unassigned_user_ids.len(),
        seed.num_users
    );
    assert_eq!(result.strategy_used, AssignmentStrategy::MinCostFlow);

    let mut per_opp: std::collections::BTreeMap<&str, u32> = std::collections::BTreeMap::new();
    for (_, opp_id) in &result.assignments {
        *per_opp.entry(opp_id.as_str()).or_insert(0) += 1;
    }
    let snapshot = engine.state_snapshot();
    for o in &snapshot.opps {
        let used = per_opp.get(o.id.as_str()).copied().unwrap_or(0);
        assert!(used <= o.capacity, "opp {} oversubscribed: {used} > {}", o.id, o.capacity);
    }
}

/// Scenario B: two users chase one capacity-1 opp; exactly one is
/// assigned and the other is reported unassigned, never both or neither.
#[test]
fn scenario_b_capacity_saturation_leaves_one_unassigned() {
    let engine = test_engine();
    engine.store().upsert_opp(opp("o0", 1));
    engine.store().upsert_user(user("u0"));
    engine.store().upsert_user(user("u1"));

    let result = engine.solve(None, false, None, 3).unwrap();
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.unassigned_user_ids.len(), 1);
}

/// Scenario C: repeated accept/click feedback on one opp raises net
/// demand and, after a pulse refresh, pushes its pulse above neutral
/// (50), while an opp with no activity stays put.
#[test]
fn scenario_c_demand_feedback_moves_pulse_above_neutral() {
    let engine = test_engine();
    engine.store().upsert_opp(opp("hot", 20));
    engine.store().upsert_opp(opp("quiet", 20));
    engine.store().upsert_user(user("u0"));

    for _ in 0..10 {
        engine.record_feedback("u0", "hot", FeedbackEvent::Accepted).unwrap();
    }

    let pulses = engine.store().refresh_pulses(true);
    assert!(pulses["hot"] > 50.0, "hot pulse should rise above neutral: {}", pulses["hot"]);
    assert_eq!(pulses["quiet"], 50.0);
}

/// Scenario D: a user whose availability excludes the opp's time
/// bucket is never scored or assigned against it, even when every
/// other feature matches perfectly.
#[test]
fn scenario_d_availability_is_a_hard_gate() {
    let engine = test_engine();
    let mut picky = user("u0");
    picky.availability = ["weekends".to_string()].into_iter().collect();
    engine.store().upsert_user(picky);
    engine.store().upsert_opp(opp("o0", 5));

    let result = engine.solve(None, false, None, 3).unwrap();
    assert!(result.assignments.is_empty());
    assert_eq!(result.unassigned_user_ids, vec!["u0".to_string()]);

    let explain_err = engine.explain("o0", "u0");
    assert!(explain_err.is_err(), "infeasible pair should have no explanation");
}

/// Scenario E: with a single capacity-1 opp and two users in distinct
/// cohorts who are otherwise identical, a fairness-weighted re-solve
/// flips the slot to whichever cohort lost the first round.
#[test]
fn scenario_e_fairness_boost_reallocates_toward_underserved_cohort() {
    let engine = test_engine();
    engine.store().upsert_opp(opp("o0", 1));
    let mut u_a = user("u_a");
    u_a.cohort = Some("cohort_a".to_string());
    let mut u_b = user("u_b");
    u_b.cohort = Some("cohort_b".to_string());
    engine.store().upsert_user(u_a);
    engine.store().upsert_user(u_b);

    let first = engine.solve(None, false, None, 3).unwrap();
    assert_eq!(first.assignments.len(), 1);
    let served_first = first.assignments[0].0.clone();

    let second = engine.solve(None, true, Some(1.0), 3).unwrap();
    assert_eq!(second.assignments.len(), 1);
    let served_second = second.assignments[0].0.clone();

    assert_ne!(
        served_first, served_second,
        "fairness boost should flip the single slot to the previously unserved cohort"
    );
}

/// Scenario F: demo_step shocks one opportunity's popularity and its
/// pulse moves; rebalance then reports it among the top pulse movers.
#[test]
fn scenario_f_hot_event_oversubscription_demo() {
    let engine = test_engine();
    let seed = engine.demo_setup(10, 5);
    assert_eq!(seed.num_opps, 5);

    let step = engine.demo_step(None);
    let shocked = step.shocked_opp_id.expect("opps were seeded");
    assert!(step.pulse_delta > 0.0, "shocked opp's pulse should rise: {}", step.pulse_delta);

    let rebalance = engine.rebalance(None, true, None, 3).unwrap();
    assert!(
        rebalance.top_pulse_movers.iter().any(|m| m.opp_id == shocked),
        "shocked opp should appear among top pulse movers"
    );
}

#[test]
fn rsvp_then_feed_reflects_declining_spots_left() {
    let engine = test_engine();
    engine.store().upsert_opp(opp("o0", 1));
    engine.store().upsert_user(user("u0"));

    let detail_before = engine.event_detail("o0", false).unwrap();
    assert_eq!(detail_before.spots_left, 1);

    assert_eq!(engine.rsvp("o0", "u0").unwrap(), RsvpOutcome::Confirmed { spots_left: 0 });

    let detail_after = engine.event_detail("o0", false).unwrap();
    assert_eq!(detail_after.spots_left, 0);
}

#[test]
fn create_event_rejects_duplicate_explicit_id() {
    let engine = test_engine();
    engine.create_event(opp("o0", 5)).unwrap();
    let err = engine.create_event(opp("o0", 5));
    assert!(err.is_err());
}

#[test]
fn goal_hints_drive_goal_match_in_explanation() {
    let engine = test_engine();
    let mut learner = user("u0");
    learner.goal = Some(Goal::Learn);
    engine.store().upsert_user(learner);
    let mut workshop = opp("o0", 5);
    workshop.category = "learning".into();
    workshop.tags = vec!["workshop".into()];
    engine.store().upsert_opp(workshop);

    let explanation = engine.explain("o0", "u0").unwrap();
    assert_eq!(explanation.goal_match, 1.0);
}

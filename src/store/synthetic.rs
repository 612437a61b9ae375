//! Synthetic population generation for demos/tests, and the popularity
//! "shock" used to make pulse movement visible.
//!
//! Grounded on `original_source/.../services/simulation.py`.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{FeedbackEvent, Goal, GroupSize, Intensity, Opportunity, User};
use crate::store::state::StateStore;

const TAGS: &[&str] = &[
    "art", "music", "sports", "tech", "outdoors", "food", "community", "volunteer", "learn",
    "fitness", "games", "wellness",
];
const TIME_BUCKETS: &[&str] = &["weeknights", "weekends", "weekday-mornings"];
const CATEGORIES: &[&str] = &["social", "fitness", "learning", "service", "outdoors", "arts"];
const COHORTS: &[&str] = &["newcomer", "regular", "veteran"];

/// Geographic cluster centers population/opps are sampled around, so
/// synthetic data has realistic travel-distance spread instead of a
/// uniform scatter (spec §6 "clustered random data").
const CLUSTER_CENTERS: &[(f64, f64)] = &[
    (1.283, 103.851),
    (1.333, 103.742),
    (1.349, 103.944),
    (1.436, 103.786),
];

fn pick_tags(rng: &mut impl Rng) -> Vec<String> {
    let k = rng.gen_range(2..=4);
    let mut tags: Vec<&str> = TAGS.to_vec();
    tags.shuffle(rng);
    tags.into_iter().take(k).map(String::from).collect()
}

fn clustered_point(rng: &mut impl Rng) -> (f64, f64) {
    let (cx, cy) = *CLUSTER_CENTERS.choose(rng).expect("non-empty");
    (cx + rng.gen_range(-0.03..0.03), cy + rng.gen_range(-0.03..0.03))
}

fn random_group_size(rng: &mut impl Rng) -> GroupSize {
    *[GroupSize::Small, GroupSize::Medium, GroupSize::Large]
        .choose(rng)
        .expect("non-empty")
}

fn random_intensity(rng: &mut impl Rng) -> Intensity {
    *[Intensity::Low, Intensity::Med, Intensity::High]
        .choose(rng)
        .expect("non-empty")
}

fn random_goal(rng: &mut impl Rng) -> Option<Goal> {
    *[None, Some(Goal::Friends), Some(Goal::Active), Some(Goal::Volunteer), Some(Goal::Learn)]
        .choose(rng)
        .expect("non-empty")
}

fn random_cohort(rng: &mut impl Rng) -> Option<String> {
    let mut choices: Vec<Option<String>> = vec![None];
    choices.extend(COHORTS.iter().map(|c| Some(c.to_string())));
    choices.choose(rng).expect("non-empty").clone()
}

/// Generates `num_users` users and `num_opps` opportunities clustered
/// around a handful of fixed geographic centers.
pub fn generate_synthetic(num_users: usize, num_opps: usize) -> (Vec<User>, Vec<Opportunity>) {
    let mut rng = rand::thread_rng();

    let users = (0..num_users)
        .map(|i| {
            let (lat, lng) = clustered_point(&mut rng);
            let num_buckets = rng.gen_range(1..=TIME_BUCKETS.len());
            let mut buckets: Vec<&str> = TIME_BUCKETS.to_vec();
            buckets.shuffle(&mut rng);
            User {
                id: format!("u{i}"),
                interests: pick_tags(&mut rng).into_iter().collect(),
                lat,
                lng,
                max_travel_mins: rng.gen_range(10..=60),
                availability: buckets.into_iter().take(num_buckets).map(String::from).collect(),
                group_pref: random_group_size(&mut rng),
                intensity_pref: random_intensity(&mut rng),
                goal: random_goal(&mut rng),
                cohort: random_cohort(&mut rng),
            }
        })
        .collect();

    let opps = (0..num_opps)
        .map(|i| {
            let (lat, lng) = clustered_point(&mut rng);
            Opportunity {
                id: format!("o{i}"),
                title: format!("Event {i}"),
                description: String::new(),
                tags: pick_tags(&mut rng),
                category: (*CATEGORIES.choose(&mut rng).expect("non-empty")).to_string(),
                time_bucket: (*TIME_BUCKETS.choose(&mut rng).expect("non-empty")).to_string(),
                starts_at: None,
                lat,
                lng,
                capacity: rng.gen_range(5..=25),
                group_size: random_group_size(&mut rng),
                intensity: random_intensity(&mut rng),
                beginner_friendly: *[true, true, false].choose(&mut rng).expect("non-empty"),
            }
        })
        .collect();

    (users, opps)
}

/// Feeds a burst of synthetic `clicked`/`accepted` events at one
/// opportunity so an operator can watch its pulse move. Picks the
/// first opp in the store if `opp_id` is `None`; returns the opp id
/// shocked, or `None` if the store has no opportunities loaded.
pub fn shock_popularity(
    store: &StateStore,
    opp_id: Option<&str>,
    clicks: u32,
    accepts: u32,
) -> Option<String> {
    let target = match opp_id {
        Some(id) => store.get_opp(id).map(|_| id.to_string()),
        None => store.snapshot().opps.first().map(|o| o.id.clone()),
    }?;

    for _ in 0..clicks {
        store.record_feedback("synthetic", &target, FeedbackEvent::Clicked);
    }
    for _ in 0..accepts {
        store.record_feedback("synthetic", &target, FeedbackEvent::Accepted);
    }

    Some(target)
}

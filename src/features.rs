//! Pure feature extraction: `(user, opp, interactions) -> (features, reason chips)`.
//!
//! No state access, no side effects — grounded on
//! `original_source/.../domain/features.py`, the one module in the
//! source tree with no store dependency at all.

use std::collections::BTreeMap;

use crate::domain::{Interaction, Opportunity, User};

pub type FeatureVector = BTreeMap<&'static str, f64>;

pub fn interest_jaccard(a: &User, b: &Opportunity) -> f64 {
    let set_u = a.interests_lower();
    let set_o: std::collections::BTreeSet<String> =
        b.tags.iter().map(|t| t.to_lowercase()).collect();

    if set_u.is_empty() && set_o.is_empty() {
        return 0.0;
    }
    let intersection = set_u.intersection(&set_o).count();
    let union = set_u.union(&set_o).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

pub fn travel_minutes(user: &User, opp: &Opportunity, distance_scale_mins: f64) -> f64 {
    let dx = user.lat - opp.lat;
    let dy = user.lng - opp.lng;
    (dx * dx + dy * dy).sqrt() * distance_scale_mins
}

pub fn travel_penalty(user: &User, opp: &Opportunity, distance_scale_mins: f64) -> f64 {
    if user.max_travel_mins <= 0 {
        return 1.0;
    }
    let mins = travel_minutes(user, opp, distance_scale_mins);
    (mins / user.max_travel_mins as f64).min(1.0)
}

pub fn availability_ok(user: &User, opp: &Opportunity) -> bool {
    user.availability.is_empty() || user.availability.contains(&opp.time_bucket)
}

pub fn group_match(user: &User, opp: &Opportunity) -> f64 {
    1.0 - (user.group_pref.as_num() - opp.group_size.as_num()).abs()
}

pub fn intensity_mismatch(user: &User, opp: &Opportunity) -> f64 {
    (user.intensity_pref.as_num() - opp.intensity.as_num()).abs()
}

/// 1 if no prior interaction between this user and opp exists; 0 if one
/// does; 0.5 when the log is empty (spec §4.1).
pub fn novelty_bonus(user: &User, opp: &Opportunity, interactions: &[Interaction]) -> f64 {
    if interactions.is_empty() {
        return 0.5;
    }
    let seen = interactions
        .iter()
        .any(|i| i.user_id == user.id && i.opp_id == opp.id);
    if seen { 0.0 } else { 1.0 }
}

/// Full feature vector plus the reason chips that cross their emission
/// threshold (spec §4.1).
pub fn compute_feature_vector(
    user: &User,
    opp: &Opportunity,
    interactions: &[Interaction],
    distance_scale_mins: f64,
) -> (FeatureVector, Vec<&'static str>) {
    let interest = interest_jaccard(user, opp);
    let travel_mins = travel_minutes(user, opp, distance_scale_mins);
    let penalty = travel_penalty(user, opp, distance_scale_mins);
    let avail_ok = availability_ok(user, opp);
    let group = group_match(user, opp);
    let intensity_gap = intensity_mismatch(user, opp);
    let novelty = novelty_bonus(user, opp, interactions);

    let mut chips = Vec::new();
    if interest >= 0.5 {
        chips.push("Matches interests");
    }
    if penalty <= 0.3 {
        chips.push("Close by");
    }
    if avail_ok {
        chips.push("Fits availability");
    }
    if group >= 0.7 {
        chips.push("Good group size");
    }
    if intensity_gap <= 0.2 {
        chips.push("Comfortable intensity");
    }
    if novelty >= 0.7 {
        chips.push("Fresh option");
    }

    let mut features = FeatureVector::new();
    features.insert("interest", interest);
    features.insert("travel_minutes", travel_mins);
    features.insert("travel_penalty", penalty);
    features.insert("availability_ok", if avail_ok { 1.0 } else { 0.0 });
    features.insert("group_match", group);
    features.insert("intensity_mismatch", intensity_gap);
    features.insert("novelty_bonus", novelty);

    (features, chips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GroupSize, Intensity};
    use std::collections::BTreeSet;

    fn user(interests: &[&str]) -> User {
        User {
            id: "u0".into(),
            interests: interests.iter().map(|s| s.to_string()).collect(),
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

    fn opp(tags: &[&str]) -> Opportunity {
        Opportunity {
            id: "o0".into(),
            title: String::new(),
            description: String::new(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
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

    #[test]
    fn jaccard_is_symmetric_and_self_identical() {
        let a = user(&["tech", "art"]);
        let o1 = opp(&["art", "tech", "food"]);
        let o2 = opp(&["tech", "art"]);

        let j_ao1 = interest_jaccard(&a, &o1);
        // Identical tag sets (mod case) give 1.0.
        assert!((interest_jaccard(&a, &o2) - 1.0).abs() < 1e-9);
        assert!(j_ao1 > 0.0 && j_ao1 < 1.0);
    }

    #[test]
    fn jaccard_zero_when_both_empty() {
        let a = user(&[]);
        let o = opp(&[]);
        assert_eq!(interest_jaccard(&a, &o), 0.0);
    }

    #[test]
    fn travel_penalty_is_one_when_max_travel_non_positive() {
        let mut a = user(&[]);
        a.max_travel_mins = 0;
        let o = opp(&[]);
        assert_eq!(travel_penalty(&a, &o, 10.0), 1.0);
    }

    #[test]
    fn availability_empty_set_means_any_bucket_ok() {
        let a = user(&[]);
        let o = opp(&[]);
        assert!(availability_ok(&a, &o));
    }

    #[test]
    fn novelty_is_half_with_empty_log_zero_with_prior_interaction() {
        let a = user(&[]);
        let o = opp(&[]);
        assert_eq!(novelty_bonus(&a, &o, &[]), 0.5);

        let prior = vec![Interaction {
            user_id: "u0".into(),
            opp_id: "o0".into(),
            event: crate::domain::FeedbackEvent::Shown,
            ts_ms: 0,
        }];
        assert_eq!(novelty_bonus(&a, &o, &prior), 0.0);
    }
}

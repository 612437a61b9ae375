//! Cohort-fairness helpers.
//!
//! Grounded on `original_source/.../optimizer/fairness.py`.

use std::collections::BTreeMap;

use crate::domain::User;

/// `rates[cohort] = assigned_in_last_assignment / cohort_population`.
pub fn exposure_rates(users: &[User], last_assignment: &[(String, String)]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();
    for u in users {
        if let Some(cohort) = &u.cohort {
            *totals.entry(cohort.clone()).or_insert(0) += 1;
        }
    }

    let user_cohort: BTreeMap<&str, &Option<String>> =
        users.iter().map(|u| (u.id.as_str(), &u.cohort)).collect();

    let mut assigned: BTreeMap<String, u32> = BTreeMap::new();
    for (user_id, _opp_id) in last_assignment {
        if let Some(Some(cohort)) = user_cohort.get(user_id.as_str()) {
            *assigned.entry(cohort.clone()).or_insert(0) += 1;
        }
    }

    totals
        .into_iter()
        .map(|(cohort, total)| {
            let rate = if total > 0 {
                *assigned.get(&cohort).unwrap_or(&0) as f64 / total as f64
            } else {
                0.0
            };
            (cohort, rate)
        })
        .collect()
}

/// Fairness gap: max - min of per-cohort assigned rates.
pub fn fairness_gap(rates: &BTreeMap<String, f64>) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    let max = rates.values().cloned().fold(f64::MIN, f64::max);
    let min = rates.values().cloned().fold(f64::MAX, f64::min);
    max - min
}

/// `boost(u) = max(0, max(rates) - rates[u.cohort])`, 0 if the user has
/// no cohort or no cohort has recorded any population yet (spec §4.4
/// step 7).
pub fn fairness_boost(user: &User, rates: &BTreeMap<String, f64>) -> f64 {
    let Some(cohort) = &user.cohort else {
        return 0.0;
    };
    if rates.is_empty() {
        return 0.0;
    }
    let max_rate = rates.values().cloned().fold(f64::MIN, f64::max);
    let user_rate = rates.get(cohort).copied().unwrap_or(0.0);
    (max_rate - user_rate).max(0.0)
}

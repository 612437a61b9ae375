//! Aggregate marketplace metrics: utilization, fill ratio, fairness
//! gap, exposure inequality, recommendation diversity, and the
//! over/underdemanded leaderboards used by the trending surface.
//!
//! Grounded on `original_source/.../metrics/compute.py`.

use std::collections::BTreeMap;

use crate::domain::{Interaction, Opportunity, User};
use crate::fairness;
use crate::recommend::Recommendation;

#[derive(Clone, Debug, PartialEq)]
pub struct OppFill {
    pub opp_id: String,
    pub fill: f64,
    pub pulse: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetricsResult {
    pub utilization: f64,
    pub avg_fill_ratio: f64,
    pub fairness_gap: f64,
    pub top_overdemanded: Vec<OppFill>,
    pub top_underfilled: Vec<OppFill>,
    pub gini_exposure: f64,
    pub avg_diversity: f64,
}

/// Gini coefficient of a non-negative value list; 0.0 for an empty
/// list or an all-zero list (no exposure inequality to report).
fn gini(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    let mut cumulative = 0.0;
    for (i, val) in sorted.iter().enumerate() {
        cumulative += (i as f64 + 1.0) * val;
    }
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    (2.0 * cumulative) / (n * total) - (n + 1.0) / n
}

/// Unique-category count per user, preferring the live recommendation
/// set (primary + alternatives) and falling back to interaction
/// history for users with no recommendation computed yet.
fn diversity_per_user(
    users: &[User],
    opps_by_id: &BTreeMap<&str, &Opportunity>,
    recommendations: Option<&BTreeMap<String, Recommendation>>,
    interactions: &[Interaction],
) -> BTreeMap<String, usize> {
    if let Some(recs) = recommendations {
        return recs
            .iter()
            .map(|(user_id, rec)| {
                let mut categories = std::collections::BTreeSet::new();
                for opp_id in rec.primary.iter().chain(rec.alternatives.iter()) {
                    if let Some(opp) = opps_by_id.get(opp_id.as_str()) {
                        categories.insert(opp.category.clone());
                    }
                }
                (user_id.clone(), categories.len())
            })
            .collect();
    }

    users
        .iter()
        .map(|user| {
            let mut categories = std::collections::BTreeSet::new();
            for interaction in interactions {
                if interaction.user_id != user.id {
                    continue;
                }
                if let Some(opp) = opps_by_id.get(interaction.opp_id.as_str()) {
                    categories.insert(opp.category.clone());
                }
            }
            (user.id.clone(), categories.len())
        })
        .collect()
}

/// Computes the full metrics bundle. `pulses` must already hold a
/// current pulse per opp id (caller runs the pulse engine first, same
/// contract as `Scorer::build_score_matrix`).
pub fn compute_metrics(
    users: &[User],
    opps: &[Opportunity],
    assignments: &[(String, String)],
    interactions: &[Interaction],
    pulses: &BTreeMap<String, f64>,
    recommendations: Option<&BTreeMap<String, Recommendation>>,
) -> MetricsResult {
    let opps_by_id: BTreeMap<&str, &Opportunity> =
        opps.iter().map(|o| (o.id.as_str(), o)).collect();

    let total_capacity: u32 = opps.iter().map(|o| o.capacity).sum();
    let assigned_seats = assignments.len();
    let utilization = if total_capacity > 0 {
        assigned_seats as f64 / total_capacity as f64
    } else {
        0.0
    };

    let mut assigned_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for (_, opp_id) in assignments {
        *assigned_counts.entry(opp_id.as_str()).or_insert(0) += 1;
    }

    let fill_by_opp: BTreeMap<&str, f64> = opps
        .iter()
        .map(|o| {
            let fill = if o.capacity == 0 {
                0.0
            } else {
                *assigned_counts.get(o.id.as_str()).unwrap_or(&0) as f64 / o.capacity as f64
            };
            (o.id.as_str(), fill)
        })
        .collect();

    let avg_fill_ratio = if opps.is_empty() {
        0.0
    } else {
        fill_by_opp.values().sum::<f64>() / opps.len() as f64
    };

    let rates = fairness::exposure_rates(users, assignments);
    let fairness_gap = fairness::fairness_gap(&rates);

    let mut fills: Vec<OppFill> = opps
        .iter()
        .map(|o| {
            let pulse = pulses.get(&o.id).copied().unwrap_or(50.0);
            OppFill {
                opp_id: o.id.clone(),
                fill: pulse / 100.0,
                pulse,
            }
        })
        .collect();

    let mut top_overdemanded = fills.clone();
    top_overdemanded.sort_by(|a, b| b.fill.total_cmp(&a.fill));
    top_overdemanded.truncate(3);

    fills.sort_by(|a, b| a.fill.total_cmp(&b.fill));
    fills.truncate(3);
    let top_underfilled = fills;

    let gini_exposure = gini(
        &assigned_counts.values().map(|&c| c as f64).collect::<Vec<_>>(),
    );

    let diversity = diversity_per_user(users, &opps_by_id, recommendations, interactions);
    let avg_diversity = if diversity.is_empty() {
        0.0
    } else {
        diversity.values().sum::<usize>() as f64 / diversity.len() as f64
    };

    MetricsResult {
        utilization,
        avg_fill_ratio,
        fairness_gap,
        top_overdemanded,
        top_underfilled,
        gini_exposure,
        avg_diversity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GroupSize, Intensity};

    fn opp(id: &str, capacity: u32, category: &str) -> Opportunity {
        Opportunity {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            tags: vec![],
            category: category.into(),
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

    #[test]
    fn utilization_and_fill_ratio_with_no_opps_is_zero() {
        let result = compute_metrics(&[], &[], &[], &[], &BTreeMap::new(), None);
        assert_eq!(result.utilization, 0.0);
        assert_eq!(result.avg_fill_ratio, 0.0);
    }

    #[test]
    fn utilization_reflects_assigned_over_total_capacity() {
        let opps = vec![opp("o0", 4, "fitness")];
        let assignments = vec![("u0".to_string(), "o0".to_string())];
        let result = compute_metrics(&[], &opps, &assignments, &[], &BTreeMap::new(), None);
        assert_eq!(result.utilization, 0.25);
        assert_eq!(result.avg_fill_ratio, 0.25);
    }

    #[test]
    fn gini_is_zero_for_perfectly_even_exposure() {
        assert_eq!(gini(&[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn gini_is_positive_for_uneven_exposure() {
        let g = gini(&[0.0, 0.0, 10.0]);
        assert!(g > 0.0);
    }

    #[test]
    fn top_overdemanded_and_underfilled_sort_opposite_directions() {
        let opps = vec![opp("hot", 10, "music"), opp("cold", 10, "music")];
        let pulses = BTreeMap::from([("hot".to_string(), 90.0), ("cold".to_string(), 10.0)]);
        let result = compute_metrics(&[], &opps, &[], &[], &pulses, None);
        assert_eq!(result.top_overdemanded[0].opp_id, "hot");
        assert_eq!(result.top_underfilled[0].opp_id, "cold");
    }
}

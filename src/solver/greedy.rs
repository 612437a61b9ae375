//! Greedy degradation path: used when the flow solver is unavailable or
//! returns non-optimal (spec §4.5, §9 "fallback-on-exception solver").
//! Not an optimality guarantee — a correctness fallback only.

use std::collections::BTreeMap;

use crate::scoring::ScoreMatrix;

pub fn solve_greedy(
    user_ids: &[String],
    score_matrix: &ScoreMatrix,
    capacities: &BTreeMap<String, u32>,
) -> (Vec<(String, String)>, Vec<String>) {
    let mut remaining: BTreeMap<&str, u32> =
        capacities.iter().map(|(k, v)| (k.as_str(), *v)).collect();

    let mut assignments = Vec::new();
    let mut assigned_users = std::collections::BTreeSet::new();

    for user_id in user_ids {
        let Some(row) = score_matrix.get(user_id) else {
            continue;
        };
        let mut choices: Vec<(&String, f64)> = row.iter().map(|(o, s)| (o, *s)).collect();
        choices.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (opp_id, _score) in choices {
            if let Some(cap) = remaining.get_mut(opp_id.as_str()) {
                if *cap > 0 {
                    *cap -= 1;
                    assignments.push((user_id.clone(), opp_id.clone()));
                    assigned_users.insert(user_id.clone());
                    break;
                }
            }
        }
    }

    let unassigned = user_ids
        .iter()
        .filter(|id| !assigned_users.contains(*id))
        .cloned()
        .collect();

    (assignments, unassigned)
}

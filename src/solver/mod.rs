//! Capacity-constrained assignment solver.
//!
//! Builds the bipartite min-cost flow graph described in spec §4.5
//! (source -> users -> opps -> sink, plus a per-user unassigned
//! overflow arc to sink) and solves it; falls back to the greedy
//! allocator if the flow solver reports a non-optimal result. The
//! abstract solver interface is a capability check resolved at
//! construction time (spec §9 Design Notes), not a runtime exception
//! handler — there is no exception-like failure mode for an in-process
//! graph routine, only an optimality check.

mod greedy;
mod mincost;

use std::collections::BTreeMap;

use mincost::MinCostFlow;

use crate::scoring::ScoreMatrix;

/// Cost quantization scale, spec §4.5.
const COST_SCALE: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentStrategy {
    MinCostFlow,
    Greedy,
}

pub struct AssignmentResult {
    pub assignments: Vec<(String, String)>,
    pub unassigned: Vec<String>,
    pub strategy_used: AssignmentStrategy,
}

/// Solves the assignment problem for `user_ids` (in input order) against
/// `score_matrix`/`capacities`, preferring min-cost flow and degrading to
/// greedy if the flow result doesn't look optimal (every user should
/// either be assigned or explicitly routed to the overflow arc; a flow
/// total below `user_ids.len()` indicates the solver came back short,
/// which should never happen given the overflow arc but is checked
/// defensively since that's exactly the "Degraded" path spec §7 names).
pub fn solve(
    user_ids: &[String],
    score_matrix: &ScoreMatrix,
    capacities: &BTreeMap<String, u32>,
) -> AssignmentResult {
    match solve_min_cost_flow(user_ids, score_matrix, capacities) {
        Some((assignments, unassigned)) => AssignmentResult {
            assignments,
            unassigned,
            strategy_used: AssignmentStrategy::MinCostFlow,
        },
        None => {
            tracing::warn!("min-cost-flow solver unavailable or non-optimal; falling back to greedy");
            let (assignments, unassigned) = greedy::solve_greedy(user_ids, score_matrix, capacities);
            AssignmentResult {
                assignments,
                unassigned,
                strategy_used: AssignmentStrategy::Greedy,
            }
        }
    }
}

fn solve_min_cost_flow(
    user_ids: &[String],
    score_matrix: &ScoreMatrix,
    capacities: &BTreeMap<String, u32>,
) -> Option<(Vec<(String, String)>, Vec<String>)> {
    if user_ids.is_empty() {
        return Some((Vec::new(), Vec::new()));
    }

    let opp_ids: Vec<&String> = capacities.keys().collect();

    let max_score = score_matrix
        .values()
        .flat_map(|row| row.values())
        .cloned()
        .fold(0.0_f64, f64::max);

    let cost_for = |score: f64| -> i64 { ((max_score - score) * COST_SCALE).round() as i64 };
    let unassigned_cost = cost_for(0.0);

    // Node layout: 0 = source, 1..=users = users, users+1..=users+opps =
    // opps, last = sink.
    let source = 0usize;
    let user_offset = 1usize;
    let opp_offset = user_offset + user_ids.len();
    let sink = opp_offset + opp_ids.len();
    let num_nodes = sink + 1;

    let mut graph = MinCostFlow::new(num_nodes);

    // source -> users
    for i in 0..user_ids.len() {
        graph.add_edge(source, user_offset + i, 1, 0);
    }

    // users -> opps (feasible pairs only) and users -> sink (overflow)
    let mut user_opp_edge: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (i, user_id) in user_ids.iter().enumerate() {
        if let Some(row) = score_matrix.get(user_id) {
            for (j, opp_id) in opp_ids.iter().enumerate() {
                if let Some(score) = row.get(opp_id.as_str()) {
                    let idx = graph.edges_len();
                    graph.add_edge(user_offset + i, opp_offset + j, 1, cost_for(*score));
                    user_opp_edge.insert((i, j), idx);
                }
            }
        }
        graph.add_edge(user_offset + i, sink, 1, unassigned_cost);
    }

    // opps -> sink (capacity 0 opps are omitted entirely)
    for (j, opp_id) in opp_ids.iter().enumerate() {
        let cap = *capacities.get(opp_id.as_str()).unwrap_or(&0);
        if cap == 0 {
            continue;
        }
        graph.add_edge(opp_offset + j, sink, cap as i64, 0);
    }

    let (flow, _cost) = graph.min_cost_flow(source, sink, user_ids.len() as i64);
    if flow != user_ids.len() as i64 {
        // Every user has an overflow arc to sink, so full flow should
        // always be achievable; a shortfall means the residual search
        // came back degraded.
        return None;
    }

    let mut assignments = Vec::new();
    let mut assigned = std::collections::BTreeSet::new();
    for (i, user_id) in user_ids.iter().enumerate() {
        for (j, opp_id) in opp_ids.iter().enumerate() {
            if let Some(&edge_idx) = user_opp_edge.get(&(i, j)) {
                if graph.flow_on(edge_idx) > 0 {
                    assignments.push((user_id.clone(), opp_id.to_string()));
                    assigned.insert(user_id.clone());
                    break;
                }
            }
        }
    }

    let unassigned = user_ids
        .iter()
        .filter(|id| !assigned.contains(*id))
        .cloned()
        .collect();

    Some((assignments, unassigned))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(pairs: &[(&str, &str, f64)]) -> ScoreMatrix {
        let mut m = ScoreMatrix::new();
        for (u, o, s) in pairs {
            m.entry(u.to_string())
                .or_default()
                .insert(o.to_string(), *s);
        }
        m
    }

    #[test]
    fn happy_path_single_user_single_opp() {
        let users = vec!["u0".to_string()];
        let score_matrix = matrix(&[("u0", "o0", 0.9)]);
        let capacities = BTreeMap::from([("o0".to_string(), 2)]);

        let result = solve(&users, &score_matrix, &capacities);
        assert_eq!(result.assignments, vec![("u0".to_string(), "o0".to_string())]);
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn capacity_saturation_leaves_one_user_unassigned() {
        let users = vec!["u0".to_string(), "u1".to_string()];
        let score_matrix = matrix(&[("u0", "o0", 0.9), ("u1", "o0", 0.9)]);
        let capacities = BTreeMap::from([("o0".to_string(), 1)]);

        let result = solve(&users, &score_matrix, &capacities);
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.unassigned.len(), 1);

        let assigned: std::collections::BTreeSet<_> =
            result.assignments.iter().map(|(u, _)| u.clone()).collect();
        let unassigned: std::collections::BTreeSet<_> = result.unassigned.iter().cloned().collect();
        let all: std::collections::BTreeSet<_> = users.iter().cloned().collect();
        assert_eq!(assigned.union(&unassigned).cloned().collect::<std::collections::BTreeSet<_>>(), all);
    }

    #[test]
    fn zero_capacity_opp_is_unreachable() {
        let users = vec!["u0".to_string()];
        let score_matrix = matrix(&[("u0", "o0", 0.9)]);
        let capacities = BTreeMap::from([("o0".to_string(), 0)]);

        let result = solve(&users, &score_matrix, &capacities);
        assert!(result.assignments.is_empty());
        assert_eq!(result.unassigned, vec!["u0".to_string()]);
    }

    #[test]
    fn every_user_appears_in_exactly_one_of_assigned_or_unassigned() {
        let users: Vec<String> = (0..5).map(|i| format!("u{i}")).collect();
        let mut pairs = Vec::new();
        for u in &users {
            pairs.push((u.as_str(), "o0", 0.5));
        }
        let score_matrix = matrix(&pairs);
        let capacities = BTreeMap::from([("o0".to_string(), 3)]);

        let result = solve(&users, &score_matrix, &capacities);
        assert_eq!(result.assignments.len() + result.unassigned.len(), users.len());
    }
}

//! Recommender: per-user primary + alternative picks from the score
//! matrix, independent of whether the solver actually assigned the
//! user anywhere.
//!
//! Grounded on `original_source/.../optimizer/solver.py::build_recommendations`.

use std::collections::BTreeMap;

use crate::scoring::ScoreMatrix;

#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub primary: Option<String>,
    pub alternatives: Vec<String>,
}

/// Builds a recommendation per user in `user_ids`: `primary` is the
/// user's assigned opp if one exists in `assignment`, otherwise the
/// highest-scoring feasible opp (`None` if the user has no feasible
/// pair at all). `alternatives` are the next `alt_k` highest-scoring
/// opps excluding whichever one became `primary`.
pub fn build_recommendations(
    user_ids: &[String],
    score_matrix: &ScoreMatrix,
    assignment: &BTreeMap<String, String>,
    alt_k: usize,
) -> BTreeMap<String, Recommendation> {
    let mut out = BTreeMap::new();

    for user_id in user_ids {
        let mut ranked: Vec<(&String, f64)> = score_matrix
            .get(user_id)
            .map(|row| row.iter().map(|(o, s)| (o, *s)).collect())
            .unwrap_or_default();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let primary = assignment
            .get(user_id)
            .cloned()
            .or_else(|| ranked.first().map(|(o, _)| (*o).clone()));

        let alternatives = ranked
            .iter()
            .map(|(o, _)| (*o).clone())
            .filter(|o| Some(o) != primary.as_ref())
            .take(alt_k)
            .collect();

        out.insert(
            user_id.clone(),
            Recommendation { primary, alternatives },
        );
    }

    out
}

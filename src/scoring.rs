//! Scorer: combines features, the predictor's `s_ml`, pulse-centering,
//! fairness, and the newcomer boost into a final fit score, with a full
//! breakdown for explanation.
//!
//! Grounded on `original_source/.../optimizer/solver.py::build_score_matrix`
//! for the arithmetic and `.../ml/rsvp_model.py` for `s_ml`. Deterministic:
//! no randomness anywhere in this module (spec §4.4 "Determinism").

use std::collections::BTreeMap;

use crate::config::Config;
use crate::domain::{Interaction, Opportunity, User};
use crate::fairness;
use crate::features::{self, FeatureVector};
use crate::predictor::Predictor;

pub type ScoreMatrix = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Clone, Debug)]
pub struct ScoreExplanation {
    pub final_score: f64,
    pub features: FeatureVector,
    pub goal_match: f64,
    pub s_ml_raw: f64,
    pub newcomer_boost_applied: f64,
    pub s_ml: f64,
    pub pulse: f64,
    pub pulse_centered: f64,
    pub price_adjustment: f64,
    pub fairness_boost: f64,
    /// Weighted linear combination of the raw features — a secondary
    /// diagnostic carried from `original_source`'s `base_score`. Never
    /// feeds `final_score` (see SPEC_FULL.md §4.4).
    pub base_score_hint: f64,
    pub reason_chips: Vec<&'static str>,
}

pub fn explanation_key(user_id: &str, opp_id: &str) -> String {
    format!("{user_id}|{opp_id}")
}

fn goal_match(user: &User, opp: &Opportunity) -> f64 {
    match user.goal {
        None => 0.0,
        Some(goal) => {
            let haystack = opp.goal_haystack();
            if goal.hints().iter().any(|h| haystack.contains(h)) {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Weights for the diagnostic `base_score_hint`, grounded on
/// `original_source/.../optimizer/solver.py::DEFAULT_WEIGHTS`.
struct HintWeights {
    interest: f64,
    goal: f64,
    group: f64,
    travel: f64,
    intensity: f64,
    novelty: f64,
}

const DEFAULT_HINT_WEIGHTS: HintWeights = HintWeights {
    interest: 3.0,
    goal: 2.0,
    group: 1.0,
    travel: 3.0,
    intensity: 1.0,
    novelty: 0.5,
};

fn base_score_hint(features: &FeatureVector, goal: f64) -> f64 {
    let w = &DEFAULT_HINT_WEIGHTS;
    w.interest * features["interest"] + w.goal * goal + w.group * features["group_match"]
        - w.travel * features["travel_penalty"]
        - w.intensity * features["intensity_mismatch"]
        + w.novelty * features["novelty_bonus"]
}

pub struct Scorer<'a> {
    pub config: &'a Config,
    pub predictor: &'a Predictor,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a Config, predictor: &'a Predictor) -> Self {
        Self { config, predictor }
    }

    /// Builds the score matrix and explanation map for `users x opps`.
    ///
    /// `pulses` must hold a current pulse for every opp id present in
    /// `opps` (the caller runs the pulse engine first). `last_assignment`
    /// and `apply_fairness`/`lambda_fair` drive the optional fairness
    /// term (spec §4.4 step 7).
    #[allow(clippy::too_many_arguments)]
    pub fn build_score_matrix(
        &self,
        users: &[User],
        opps: &[Opportunity],
        interactions: &[Interaction],
        pulses: &BTreeMap<String, f64>,
        last_assignment: &[(String, String)],
        apply_fairness: bool,
        lambda_fair: f64,
    ) -> (ScoreMatrix, BTreeMap<String, ScoreExplanation>) {
        let fairness_rates = if apply_fairness {
            fairness::exposure_rates(users, last_assignment)
        } else {
            Default::default()
        };

        let mut matrix = ScoreMatrix::new();
        let mut explanations = BTreeMap::new();

        for user in users {
            let row = matrix.entry(user.id.clone()).or_default();
            for opp in opps {
                let (features, chips) = features::compute_feature_vector(
                    user,
                    opp,
                    interactions,
                    self.config.distance_scale_mins,
                );

                // Hard infeasibility gate: skip pairs failing availability.
                if features["availability_ok"] < 0.5 {
                    continue;
                }

                let mut chips = chips;
                let goal = goal_match(user, opp);
                let pulse = pulses.get(&opp.id).copied().unwrap_or(50.0);
                let pulse_centered = pulse - 50.0;

                let mut ml_input = features.clone();
                ml_input.insert("goal_match", goal);
                ml_input.insert("pulse_centered", pulse_centered);
                let s_ml_raw = self.predictor.predict(&ml_input);

                let newcomer_eligible = user.is_newcomer_cohort()
                    && opp.beginner_friendly
                    && self.config.newcomer_boost > 0.0;
                let (s_ml, newcomer_boost_applied) = if newcomer_eligible {
                    chips.push("Beginner-friendly for newcomers");
                    (
                        (s_ml_raw * (1.0 + self.config.newcomer_boost)).min(1.0),
                        self.config.newcomer_boost,
                    )
                } else {
                    (s_ml_raw, 0.0)
                };

                let price_adjustment = -self.config.pricing_lambda * pulse_centered;

                let boost = if apply_fairness {
                    fairness::fairness_boost(user, &fairness_rates)
                } else {
                    0.0
                };
                let fairness_term = if apply_fairness { lambda_fair * boost } else { 0.0 };

                let final_score = s_ml + price_adjustment + fairness_term;

                row.insert(opp.id.clone(), final_score);
                explanations.insert(
                    explanation_key(&user.id, &opp.id),
                    ScoreExplanation {
                        final_score,
                        base_score_hint: base_score_hint(&features, goal),
                        features,
                        goal_match: goal,
                        s_ml_raw,
                        newcomer_boost_applied,
                        s_ml,
                        pulse,
                        pulse_centered,
                        price_adjustment,
                        fairness_boost: boost,
                        reason_chips: chips,
                    },
                );
            }
        }

        (matrix, explanations)
    }
}

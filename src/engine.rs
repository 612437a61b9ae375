//! Top-level engine: wires config, store, and predictor together and
//! exposes the public operations named in spec §6 as plain methods.
//!
//! Each method is grounded on the `original_source` route handler of
//! the same business logic (see `DESIGN.md`), minus the FastAPI/
//! pydantic request/response plumbing — callers pass and receive plain
//! Rust values.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Config;
use crate::domain::{FeedbackEvent, GroupSize, Intensity, Opportunity, User};
use crate::error::{EngineError, Result};
use crate::logger::warn_if_slow_sync;
use crate::metrics::{self, MetricsResult};
use crate::predictor::Predictor;
use crate::pulse::PulseHistoryEntry;
use crate::recommend::{self, Recommendation};
use crate::scoring::{Scorer, ScoreExplanation};
use crate::solver::{self, AssignmentStrategy};
use crate::store::{fixture, synthetic, training_log, StateStore};

pub struct SeedResult {
    pub num_users: usize,
    pub num_opps: usize,
}

pub struct SolveResult {
    pub assignments: Vec<(String, String)>,
    pub unassigned_user_ids: Vec<String>,
    pub recommendations: BTreeMap<String, Recommendation>,
    pub explanations: BTreeMap<String, ScoreExplanation>,
    pub pulses: BTreeMap<String, f64>,
    pub metrics: MetricsResult,
    pub strategy_used: AssignmentStrategy,
}

pub struct TrendingItem {
    pub opp_id: String,
    pub title: String,
    pub pulse: f64,
    pub pulse_delta: f64,
}

pub struct RebalanceResult {
    pub solve: SolveResult,
    pub price_deltas: BTreeMap<String, f64>,
    pub top_pulse_movers: Vec<TrendingItem>,
}

pub struct FeedbackResult {
    pub opp_id: String,
    pub demand_window: u32,
    pub shown_window: u32,
    pub total_interactions: usize,
}

pub struct FeedItem {
    pub opp_id: String,
    pub title: String,
    pub category: String,
    pub time_bucket: String,
    pub tags: Vec<String>,
    pub capacity: u32,
    pub group_size: GroupSize,
    pub intensity: Intensity,
    pub beginner_friendly: bool,
    pub fit_score: f64,
    pub pulse: f64,
    pub reasons: Vec<&'static str>,
}

pub struct EventDetail {
    pub event: Opportunity,
    pub pulse: f64,
    pub spots_left: u32,
    pub pulse_history: Option<Vec<PulseHistoryEntry>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RsvpOutcome {
    Confirmed { spots_left: u32 },
    Full,
}

pub struct StateSnapshot {
    pub users: Vec<User>,
    pub opps: Vec<Opportunity>,
    pub last_assignment: Vec<(String, String)>,
    pub pulses: BTreeMap<String, f64>,
}

pub struct DemoStepResult {
    pub shocked_opp_id: Option<String>,
    pub pulse_delta: f64,
}

/// Optional per-field patch for `update_event`, mirroring the source's
/// `EventUpdateRequest` (all-optional, apply only the fields present).
#[derive(Default)]
pub struct OpportunityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub time_bucket: Option<String>,
    pub capacity: Option<u32>,
    pub group_size: Option<GroupSize>,
    pub intensity: Option<Intensity>,
    pub beginner_friendly: Option<bool>,
}

pub struct Engine {
    config: Config,
    store: StateStore,
    predictor: Predictor,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let predictor = Predictor::load(&config.rsvp_model_path);
        let store = StateStore::new(config.pricing_liquidity_k, config.demand_decay_tau_hours);
        Self { config, store, predictor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn seed_fixture(&self, path: &str) -> Result<SeedResult> {
        let (users, opps) = fixture::load_fixture(path)?;
        let num_users = users.len();
        let num_opps = opps.len();
        self.store.load_population(users, opps);
        self.store.refresh_pulses(true);
        Ok(SeedResult { num_users, num_opps })
    }

    pub fn seed_synthetic(&self, num_users: usize, num_opps: usize) -> SeedResult {
        let (users, opps) = synthetic::generate_synthetic(num_users, num_opps);
        self.store.load_population(users, opps);
        self.store.refresh_pulses(true);
        SeedResult { num_users, num_opps }
    }

    /// Runs one scoring + assignment pass, recomputing pulses from
    /// current demand first (spec §4.3: pulse is recomputed on every
    /// solve, not just on `rebalance`/`trending` ticks). Grounded on
    /// `routes_solve.py::solve_route`.
    pub fn solve(
        &self,
        user_ids: Option<&[String]>,
        apply_fairness: bool,
        lambda_fair: Option<f64>,
        top_k: usize,
    ) -> Result<SolveResult> {
        let snapshot = self.store.snapshot();
        if snapshot.users.is_empty() || snapshot.opps.is_empty() {
            return Err(EngineError::PreconditionNotMet);
        }
        let pulses = self.store.refresh_pulses(false);

        let users: Vec<User> = match user_ids {
            Some(ids) => {
                let wanted: std::collections::BTreeSet<&str> =
                    ids.iter().map(|s| s.as_str()).collect();
                snapshot
                    .users
                    .into_iter()
                    .filter(|u| wanted.contains(u.id.as_str()))
                    .collect()
            }
            None => snapshot.users,
        };

        let lambda_fair = lambda_fair.unwrap_or(self.config.fairness_lambda);
        let scorer = Scorer::new(&self.config, &self.predictor);
        let (score_matrix, explanations) = scorer.build_score_matrix(
            &users,
            &snapshot.opps,
            &snapshot.interactions,
            &pulses,
            &snapshot.last_assignment,
            apply_fairness,
            lambda_fair,
        );

        let user_ids_in_order: Vec<String> = users.iter().map(|u| u.id.clone()).collect();
        let result = warn_if_slow_sync("assignment_solve", Duration::from_millis(200), || {
            solver::solve(&user_ids_in_order, &score_matrix, &snapshot.capacities)
        });

        self.store.publish_assignment(result.assignments.clone());

        let assignment_map: BTreeMap<String, String> = result.assignments.iter().cloned().collect();
        let recommendations =
            recommend::build_recommendations(&user_ids_in_order, &score_matrix, &assignment_map, top_k);

        let metrics = metrics::compute_metrics(
            &users,
            &snapshot.opps,
            &result.assignments,
            &snapshot.interactions,
            &pulses,
            Some(&recommendations),
        );

        Ok(SolveResult {
            assignments: result.assignments,
            unassigned_user_ids: result.unassigned,
            recommendations,
            explanations,
            pulses,
            metrics,
            strategy_used: result.strategy_used,
        })
    }

    /// Refreshes pulses from current demand, then runs `solve`,
    /// returning the per-opp pulse deltas and the top movers. Grounded
    /// on `routes_rebalance.py::rebalance`.
    pub fn rebalance(
        &self,
        user_ids: Option<&[String]>,
        apply_fairness: bool,
        lambda_fair: Option<f64>,
        top_k: usize,
    ) -> Result<RebalanceResult> {
        let before = self.store.snapshot().pulses;
        let after = self.store.refresh_pulses(true);

        let solve = self.solve(user_ids, apply_fairness, lambda_fair, top_k)?;

        let deltas: BTreeMap<String, f64> = after
            .iter()
            .map(|(opp_id, pulse)| (opp_id.clone(), pulse - before.get(opp_id).copied().unwrap_or(50.0)))
            .collect();

        let opps = self.store.snapshot().opps;
        let mut top_pulse_movers: Vec<TrendingItem> = opps
            .iter()
            .map(|o| TrendingItem {
                opp_id: o.id.clone(),
                title: o.title.clone(),
                pulse: after.get(&o.id).copied().unwrap_or(50.0),
                pulse_delta: deltas.get(&o.id).copied().unwrap_or(0.0),
            })
            .collect();
        top_pulse_movers.sort_by(|a, b| b.pulse_delta.abs().total_cmp(&a.pulse_delta.abs()));
        top_pulse_movers.truncate(3);

        Ok(RebalanceResult {
            solve,
            price_deltas: deltas,
            top_pulse_movers,
        })
    }

    /// Records a feedback event and best-effort logs it to the training
    /// JSONL stream. Grounded on `routes_feedback.py::feedback`.
    pub fn record_feedback(
        &self,
        user_id: &str,
        opp_id: &str,
        event: FeedbackEvent,
    ) -> Result<FeedbackResult> {
        if self.store.get_opp(opp_id).is_none() {
            return Err(EngineError::NotFound(format!("opportunity {opp_id}")));
        }

        self.store.record_feedback(user_id, opp_id, event);
        training_log::log_rsvp(
            &self.config.rsvp_events_log_path,
            user_id,
            opp_id,
            &format!("{event:?}").to_lowercase(),
        );

        let state = self.store.opp_state(opp_id).expect("ensured by record_feedback");
        let total_interactions = self.store.interaction_count();

        Ok(FeedbackResult {
            opp_id: opp_id.to_string(),
            demand_window: state.demand_window,
            shown_window: state.shown_window,
            total_interactions,
        })
    }

    /// Grounded on `metrics/compute.py::compute_metrics`, called
    /// standalone (no live recommendation set, so diversity falls back
    /// to interaction history).
    pub fn metrics(&self) -> MetricsResult {
        let snapshot = self.store.snapshot();
        metrics::compute_metrics(
            &snapshot.users,
            &snapshot.opps,
            &snapshot.last_assignment,
            &snapshot.interactions,
            &snapshot.pulses,
            None,
        )
    }

    /// Personalized feed for one user. Grounded on
    /// `routes_feed.py::feed`.
    pub fn feed(&self, user_id: &str, limit: usize) -> Result<Vec<FeedItem>> {
        let user = self
            .store
            .get_user(user_id)
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;

        let snapshot = self.store.snapshot();
        if snapshot.opps.is_empty() {
            return Ok(Vec::new());
        }
        let pulses = self.store.refresh_pulses(false);

        let scorer = Scorer::new(&self.config, &self.predictor);
        let (score_matrix, explanations) = scorer.build_score_matrix(
            std::slice::from_ref(&user),
            &snapshot.opps,
            &snapshot.interactions,
            &pulses,
            &snapshot.last_assignment,
            false,
            self.config.fairness_lambda,
        );

        let scored = score_matrix.get(&user.id).cloned().unwrap_or_default();
        let mut items: Vec<FeedItem> = snapshot
            .opps
            .iter()
            .filter_map(|opp| {
                let score = *scored.get(&opp.id)?;
                let expl = explanations.get(&crate::scoring::explanation_key(&user.id, &opp.id));
                Some(FeedItem {
                    opp_id: opp.id.clone(),
                    title: opp.title.clone(),
                    category: opp.category.clone(),
                    time_bucket: opp.time_bucket.clone(),
                    tags: opp.tags.clone(),
                    capacity: opp.capacity,
                    group_size: opp.group_size,
                    intensity: opp.intensity,
                    beginner_friendly: opp.beginner_friendly,
                    fit_score: score,
                    pulse: pulses.get(&opp.id).copied().unwrap_or(50.0),
                    reasons: expl.map(|e| e.reason_chips.clone()).unwrap_or_default(),
                })
            })
            .collect();

        items.sort_by(|a, b| b.fit_score.total_cmp(&a.fit_score));
        items.truncate(limit);

        for item in &items {
            self.store.record_feedback(&user.id, &item.opp_id, FeedbackEvent::Shown);
            if let Some(expl) = explanations.get(&crate::scoring::explanation_key(&user.id, &item.opp_id)) {
                let mut snapshot = expl.features.clone();
                snapshot.insert("goal_match", expl.goal_match);
                snapshot.insert("pulse_centered", expl.pulse_centered);
                training_log::log_impression(
                    &self.config.rsvp_impressions_log_path,
                    &user.id,
                    &item.opp_id,
                    &snapshot,
                );
            }
        }

        Ok(items)
    }

    /// Grounded on `routes_trending.py::trending`: refreshes pulses
    /// (recording history) and ranks by the most recent pulse swing.
    pub fn trending(&self, limit: usize) -> Vec<TrendingItem> {
        let opps = self.store.snapshot().opps;
        if opps.is_empty() {
            return Vec::new();
        }

        self.store.refresh_pulses(true);

        let mut items: Vec<TrendingItem> = opps
            .iter()
            .map(|opp| {
                let state = self.store.opp_state(&opp.id).unwrap_or_default();
                let history = &state.pulse_history;
                let (pulse, pulse_delta) = match history.len() {
                    0 => (50.0, 0.0),
                    1 => (history[0].1, 0.0),
                    n => (history[n - 1].1, history[n - 1].1 - history[n - 2].1),
                };
                TrendingItem {
                    opp_id: opp.id.clone(),
                    title: opp.title.clone(),
                    pulse,
                    pulse_delta,
                }
            })
            .collect();

        items.sort_by(|a, b| b.pulse_delta.total_cmp(&a.pulse_delta));
        items.truncate(limit);
        items
    }

    /// Grounded on `routes_events.py::get_event`, which calls
    /// `pricing.compute_pulses` for the requested opp before reading
    /// `store.prices` — this recomputes every opp's pulse the same way
    /// (cheap, and keeps a single recompute path) but records no
    /// history, since `get_event` is a read, not a tick.
    pub fn event_detail(&self, opp_id: &str, include_history: bool) -> Result<EventDetail> {
        let opp = self
            .store
            .get_opp(opp_id)
            .ok_or_else(|| EngineError::NotFound(format!("opportunity {opp_id}")))?;

        let pulses = self.store.refresh_pulses(false);
        let state = self.store.opp_state(opp_id).unwrap_or_default();
        let spots_left = opp.capacity.saturating_sub(state.rsvp.len() as u32);

        Ok(EventDetail {
            event: opp,
            pulse: pulses.get(opp_id).copied().unwrap_or(state.pulse),
            spots_left,
            pulse_history: include_history.then(|| state.pulse_history.clone()),
        })
    }

    /// Grounded on `routes_events.py::explain_event`.
    pub fn explain(&self, opp_id: &str, user_id: &str) -> Result<ScoreExplanation> {
        let user = self
            .store
            .get_user(user_id)
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))?;
        let opp = self
            .store
            .get_opp(opp_id)
            .ok_or_else(|| EngineError::NotFound(format!("opportunity {opp_id}")))?;

        let snapshot = self.store.snapshot();
        let scorer = Scorer::new(&self.config, &self.predictor);
        let (_matrix, explanations) = scorer.build_score_matrix(
            std::slice::from_ref(&user),
            std::slice::from_ref(&opp),
            &snapshot.interactions,
            &snapshot.pulses,
            &snapshot.last_assignment,
            false,
            self.config.fairness_lambda,
        );

        explanations
            .get(&crate::scoring::explanation_key(user_id, opp_id))
            .cloned()
            .ok_or_else(|| EngineError::Infeasible(format!("{user_id}|{opp_id}")))
    }

    /// Grounded on `routes_events.py::rsvp`. A full event is a
    /// structured outcome, not an error (spec §7).
    pub fn rsvp(&self, opp_id: &str, user_id: &str) -> Result<RsvpOutcome> {
        if self.store.get_user(user_id).is_none() {
            return Err(EngineError::NotFound(format!("user {user_id}")));
        }
        let opp = self
            .store
            .get_opp(opp_id)
            .ok_or_else(|| EngineError::NotFound(format!("opportunity {opp_id}")))?;

        match self.store.record_rsvp(user_id, opp_id) {
            Some(true) => {
                self.store.record_feedback(user_id, opp_id, FeedbackEvent::Accepted);
                training_log::log_rsvp(&self.config.rsvp_events_log_path, user_id, opp_id, "confirmed");
                let spots_left = opp.capacity.saturating_sub(self.store.rsvp_count(opp_id) as u32);
                Ok(RsvpOutcome::Confirmed { spots_left })
            }
            Some(false) => Ok(RsvpOutcome::Full),
            None => Err(EngineError::NotFound(format!("opportunity {opp_id}"))),
        }
    }

    /// Grounded on `routes_users.py::upsert_user`. Assigns `u{n}` when
    /// `user.id` is empty, same scheme as the source.
    pub fn upsert_user(&self, mut user: User) -> String {
        if user.id.is_empty() {
            let existing = self.store.snapshot().users.len();
            let mut idx = existing;
            loop {
                let candidate = format!("u{idx}");
                if self.store.get_user(&candidate).is_none() {
                    user.id = candidate;
                    break;
                }
                idx += 1;
            }
        }
        let id = user.id.clone();
        self.store.upsert_user(user);
        id
    }

    /// Grounded on `routes_events.py::create_event`.
    pub fn create_event(&self, mut opp: Opportunity) -> Result<String> {
        if opp.id.is_empty() {
            let existing = self.store.snapshot().opps.len();
            let mut idx = existing;
            loop {
                let candidate = format!("o{idx}");
                if self.store.get_opp(&candidate).is_none() {
                    opp.id = candidate;
                    break;
                }
                idx += 1;
            }
        } else if self.store.get_opp(&opp.id).is_some() {
            return Err(EngineError::Infeasible(format!("event id already exists: {}", opp.id)));
        }
        let id = opp.id.clone();
        self.store.upsert_opp(opp);
        Ok(id)
    }

    /// Grounded on `routes_events.py::update_event` — applies only the
    /// fields present in `patch`.
    pub fn update_event(&self, opp_id: &str, patch: OpportunityPatch) -> Result<()> {
        let mut opp = self
            .store
            .get_opp(opp_id)
            .ok_or_else(|| EngineError::NotFound(format!("opportunity {opp_id}")))?;

        if let Some(v) = patch.title {
            opp.title = v;
        }
        if let Some(v) = patch.description {
            opp.description = v;
        }
        if let Some(v) = patch.tags {
            opp.tags = v;
        }
        if let Some(v) = patch.category {
            opp.category = v;
        }
        if let Some(v) = patch.time_bucket {
            opp.time_bucket = v;
        }
        if let Some(v) = patch.capacity {
            opp.capacity = v;
        }
        if let Some(v) = patch.group_size {
            opp.group_size = v;
        }
        if let Some(v) = patch.intensity {
            opp.intensity = v;
        }
        if let Some(v) = patch.beginner_friendly {
            opp.beginner_friendly = v;
        }

        self.store.upsert_opp(opp);
        Ok(())
    }

    /// Grounded on `routes_state.py::state`.
    pub fn state_snapshot(&self) -> StateSnapshot {
        let snapshot = self.store.snapshot();
        StateSnapshot {
            users: snapshot.users,
            opps: snapshot.opps,
            last_assignment: snapshot.last_assignment,
            pulses: snapshot.pulses,
        }
    }

    /// Seeds a fresh synthetic population for the demo harness, then
    /// establishes a baseline pulse for every opp.
    pub fn demo_setup(&self, num_users: usize, num_opps: usize) -> SeedResult {
        self.seed_synthetic(num_users, num_opps)
    }

    /// One demo tick: shocks one opportunity's popularity, refreshes
    /// pulses, and reports the resulting swing. Grounded on
    /// `services/simulation.py::shock_popularity`.
    pub fn demo_step(&self, opp_id: Option<&str>) -> DemoStepResult {
        let before = self.store.snapshot().pulses;
        let shocked_opp_id = synthetic::shock_popularity(&self.store, opp_id, 15, 8);
        let after = self.store.refresh_pulses(true);

        let pulse_delta = shocked_opp_id
            .as_ref()
            .map(|id| after.get(id).copied().unwrap_or(50.0) - before.get(id).copied().unwrap_or(50.0))
            .unwrap_or(0.0);

        DemoStepResult { shocked_opp_id, pulse_delta }
    }
}

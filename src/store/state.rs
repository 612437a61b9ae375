//! Thread-safe in-memory state store.
//!
//! Grounded on `original_source/.../services/state_store.py::StateStore`
//! and, for the concurrency primitive, the teacher's
//! `session::store::SessionStore` (`parking_lot::Mutex`). The source
//! keeps six parallel per-opp maps (`prices`, `avg_fill`,
//! `demand_window`, `shown_window`, plus the pulse history living
//! elsewhere) each guarded by the same `_ensure_opp_state` call; this
//! crate collapses them into one `OpportunityState` record per opp so
//! there is a single ensure-path and no risk of the maps drifting out
//! of sync with each other.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{FeedbackEvent, Interaction, Opportunity, User};
use crate::pulse::{self, DemandState, PulseHistoryEntry};
use crate::time::now_ms;

#[derive(Clone, Debug, Default)]
pub struct OpportunityState {
    pub demand: DemandState,
    pub pulse: f64,
    pub pulse_history: Vec<PulseHistoryEntry>,
    pub shown_window: u32,
    pub demand_window: u32,
    pub rsvp: BTreeSet<String>,
}

impl OpportunityState {
    fn fresh() -> Self {
        Self {
            pulse: 50.0,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Inner {
    users: BTreeMap<String, User>,
    opps: BTreeMap<String, Opportunity>,
    opp_state: BTreeMap<String, OpportunityState>,
    interactions: Vec<Interaction>,
    last_assignment: Vec<(String, String)>,
}

impl Inner {
    fn ensure_opp_state(&mut self, opp_id: &str) {
        self.opp_state
            .entry(opp_id.to_string())
            .or_insert_with(OpportunityState::fresh);
    }

    fn reset(&mut self) {
        *self = Inner::default();
    }
}

/// Snapshot of everything needed to run a solve pass, taken under the
/// lock and handed to the caller as owned data (spec §5 copy-out).
pub struct Snapshot {
    pub users: Vec<User>,
    pub opps: Vec<Opportunity>,
    pub interactions: Vec<Interaction>,
    pub last_assignment: Vec<(String, String)>,
    pub pulses: BTreeMap<String, f64>,
    pub capacities: BTreeMap<String, u32>,
}

pub struct StateStore {
    inner: parking_lot::Mutex<Inner>,
    pricing_liquidity_k: f64,
    demand_decay_tau_hours: f64,
}

impl StateStore {
    pub fn new(pricing_liquidity_k: f64, demand_decay_tau_hours: f64) -> Self {
        Self {
            inner: parking_lot::Mutex::new(Inner::default()),
            pricing_liquidity_k,
            demand_decay_tau_hours,
        }
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Replaces the whole population (fixture/synthetic seed paths).
    pub fn load_population(&self, users: Vec<User>, opps: Vec<Opportunity>) {
        let mut inner = self.inner.lock();
        inner.reset();
        for opp in &opps {
            inner.ensure_opp_state(&opp.id);
        }
        inner.users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        inner.opps = opps.into_iter().map(|o| (o.id.clone(), o)).collect();
    }

    pub fn upsert_user(&self, user: User) {
        self.inner.lock().users.insert(user.id.clone(), user);
    }

    pub fn upsert_opp(&self, opp: Opportunity) {
        let mut inner = self.inner.lock();
        inner.ensure_opp_state(&opp.id);
        inner.opps.insert(opp.id.clone(), opp);
    }

    pub fn get_opp(&self, opp_id: &str) -> Option<Opportunity> {
        self.inner.lock().opps.get(opp_id).cloned()
    }

    pub fn get_user(&self, user_id: &str) -> Option<User> {
        self.inner.lock().users.get(user_id).cloned()
    }

    /// Records one feedback event: appends to the interaction log,
    /// bumps the `shown_window`/`demand_window` counters per spec §4.7,
    /// and feeds the decayed-demand accumulator for events that drive
    /// it (`clicked`/`accepted`/`declined`).
    pub fn record_feedback(&self, user_id: &str, opp_id: &str, event: FeedbackEvent) {
        let mut inner = self.inner.lock();
        inner.ensure_opp_state(opp_id);

        let ts_ms = now_ms();
        inner.interactions.push(Interaction {
            user_id: user_id.to_string(),
            opp_id: opp_id.to_string(),
            event,
            ts_ms,
        });

        let tau_hours = self.demand_decay_tau_hours;
        let state = inner.opp_state.get_mut(opp_id).expect("ensured above");

        if event.counts_toward_shown_window() {
            state.shown_window += 1;
        }
        if matches!(event, FeedbackEvent::Clicked | FeedbackEvent::Accepted) {
            state.demand_window += 1;
        }
        if event.drives_demand() {
            state.demand.apply_delta(event.demand_delta(), tau_hours, ts_ms);
        }
    }

    /// Records an RSVP, returning `true` if the caller secured a spot
    /// (`rsvp.len() <= capacity` afterward), `false` if the event was
    /// already full (spec invariant: rsvp set never exceeds capacity).
    pub fn record_rsvp(&self, user_id: &str, opp_id: &str) -> Option<bool> {
        let mut inner = self.inner.lock();
        let capacity = inner.opps.get(opp_id)?.capacity;
        inner.ensure_opp_state(opp_id);
        let state = inner.opp_state.get_mut(opp_id).expect("ensured above");

        if state.rsvp.contains(user_id) {
            return Some(true);
        }
        if state.rsvp.len() as u32 >= capacity {
            return Some(false);
        }
        state.rsvp.insert(user_id.to_string());
        Some(true)
    }

    /// Recomputes the pulse for every opp from its current demand state,
    /// returning the fresh pulse map (spec §4.3 "recompute from fresh
    /// input each tick"). Only appends a `pulse_history` entry when
    /// `record_history` is set — read paths that recompute on every call
    /// (`solve`, `feed`, `event_detail`) pass `false` so they don't flood
    /// the bounded history with near-duplicate entries; tick-driven
    /// callers (`rebalance`, `trending`, the demo loop) pass `true`.
    pub fn refresh_pulses(&self, record_history: bool) -> BTreeMap<String, f64> {
        let mut inner = self.inner.lock();
        let k = self.pricing_liquidity_k;
        let now = crate::time::now_iso();

        let opp_ids: Vec<String> = inner.opps.keys().cloned().collect();
        let mut out = BTreeMap::new();
        for opp_id in opp_ids {
            let capacity = inner.opps[&opp_id].capacity;
            let liquidity = pulse::liquidity_for(capacity, k);
            let state = inner.opp_state.get_mut(&opp_id).expect("ensured on load");
            let p = pulse::pulse_from_demand(state.demand.net_demand, liquidity);
            state.pulse = p;
            if record_history {
                pulse::push_history(&mut state.pulse_history, (now.clone(), p));
            }
            out.insert(opp_id, p);
        }
        out
    }

    pub fn publish_assignment(&self, assignment: Vec<(String, String)>) {
        self.inner.lock().last_assignment = assignment;
    }

    /// Copy-out snapshot for a solve pass (spec §5).
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        let pulses = inner
            .opp_state
            .iter()
            .map(|(id, s)| (id.clone(), s.pulse))
            .collect();
        let capacities = inner.opps.values().map(|o| (o.id.clone(), o.capacity)).collect();
        Snapshot {
            users: inner.users.values().cloned().collect(),
            opps: inner.opps.values().cloned().collect(),
            interactions: inner.interactions.clone(),
            last_assignment: inner.last_assignment.clone(),
            pulses,
            capacities,
        }
    }

    pub fn opp_state(&self, opp_id: &str) -> Option<OpportunityState> {
        self.inner.lock().opp_state.get(opp_id).cloned()
    }

    pub fn interaction_count(&self) -> usize {
        self.inner.lock().interactions.len()
    }

    pub fn rsvp_count(&self, opp_id: &str) -> usize {
        self.inner
            .lock()
            .opp_state
            .get(opp_id)
            .map(|s| s.rsvp.len())
            .unwrap_or(0)
    }
}

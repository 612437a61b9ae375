//! Demand→pulse market-maker.
//!
//! Per-opportunity demand is an exponentially decayed accumulator (spec
//! §4.3), mapped to a bounded pulse in `[0, 100]` through a
//! logistic-against-liquidity curve. Grounded on
//! `original_source/.../optimizer/pricing.py::compute_pulses` for the
//! formula; the per-signal owned-state shape (recompute from fresh
//! input, expose a bounded history) follows the teacher's
//! `backend/src/market/pulse/*` family, simplified to a single scalar
//! signal rather than a generic `Pulse` trait (see `DESIGN.md`).

use crate::predictor::sigmoid;
use crate::time::now_ms;

/// Pulse history is a bounded ring buffer, not an unbounded append log
/// (spec §9 Design Notes).
pub const PULSE_HISTORY_CAP: usize = 50;

/// Per-opportunity decayed demand state.
#[derive(Clone, Debug, Default)]
pub struct DemandState {
    pub net_demand: f64,
    pub last_demand_ts_ms: Option<u64>,
}

impl DemandState {
    /// Applies the decay/accumulate step for one interaction (spec §4.3):
    ///
    /// ```text
    /// dt = now - last_demand_ts
    /// net <- net * exp(-dt / (tau * 3600))
    /// net <- net + delta
    /// last_demand_ts <- now
    /// ```
    ///
    /// `tau_hours` and `now_ms` are both caller-supplied so this stays a
    /// pure function of its inputs, usable from tests with simulated
    /// time advancement (spec §8 Scenario C).
    pub fn apply_delta(&mut self, delta: f64, tau_hours: f64, now_ms: u64) {
        if let Some(last) = self.last_demand_ts_ms {
            let dt_secs = now_ms.saturating_sub(last) as f64 / 1000.0;
            let decay = (-dt_secs / (tau_hours * 3600.0)).exp();
            self.net_demand *= decay;
        }
        self.net_demand += delta;
        self.last_demand_ts_ms = Some(now_ms);
    }
}

/// `liquidity = k * max(1, capacity)`; `pulse = 100 * sigma(net / liquidity)`.
///
/// Equals 50 at `net == 0`; strictly increasing in `net` for fixed
/// liquidity (spec §8 quantified invariant).
pub fn pulse_from_demand(net_demand: f64, liquidity: f64) -> f64 {
    if liquidity <= 0.0 {
        return 50.0;
    }
    100.0 * sigmoid(net_demand / liquidity)
}

pub fn liquidity_for(capacity: u32, liquidity_k: f64) -> f64 {
    liquidity_k * (capacity.max(1) as f64)
}

/// One entry of pulse history: `(timestamp, pulse)`.
pub type PulseHistoryEntry = (String, f64);

/// Appends `entry` to `history`, keeping at most `PULSE_HISTORY_CAP`
/// entries in chronological order (oldest dropped from the front).
pub fn push_history(history: &mut Vec<PulseHistoryEntry>, entry: PulseHistoryEntry) {
    history.push(entry);
    if history.len() > PULSE_HISTORY_CAP {
        let excess = history.len() - PULSE_HISTORY_CAP;
        history.drain(0..excess);
    }
}

/// Convenience wrapper combining `apply_delta` with "now" from the
/// system clock, used by the store's `record_feedback` path.
pub fn record_interaction_demand(state: &mut DemandState, delta: f64, tau_hours: f64) {
    state.apply_delta(delta, tau_hours, now_ms());
}

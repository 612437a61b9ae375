//! Shared in-memory state store: population, per-opp demand/pulse
//! state, interaction log, and the fixture/synthetic/training-log
//! helpers that feed it.

pub mod fixture;
pub mod state;
pub mod synthetic;
pub mod training_log;

pub use state::{OpportunityState, Snapshot, StateStore};

//! Two-sided matching engine for an events-and-people marketplace:
//! scoring pipeline, demand→pulse market-maker, capacity-constrained
//! assignment solver, and the shared in-memory state store tying them
//! together.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fairness;
pub mod features;
pub mod logger;
pub mod metrics;
pub mod predictor;
pub mod pulse;
pub mod recommend;
pub mod scoring;
pub mod solver;
pub mod store;
pub mod time;

pub use config::Config;
pub use engine::Engine;
pub use error::{EngineError, Result};

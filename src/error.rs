use thiserror::Error;

/// Error taxonomy surfaced by the core engine.
///
/// `Conflict`/`Saturated` (spec §7) is deliberately absent here: a full
/// RSVP is a structured outcome (`crate::engine::RsvpOutcome::Full`),
/// not an error. `Degraded` is also absent: a min-cost-flow fallback to
/// greedy is logged via `tracing::warn!` and never surfaced to callers.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No users/opportunities loaded.")]
    PreconditionNotMet,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("infeasible pair: {0}")]
    Infeasible(String),

    #[error("io failure: {0}")]
    IoFailure(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Tracing setup and small helpers shared across the engine.
//!
//! Mirrors the teacher's `backend/src/logger.rs`: env-filtered
//! subscriber, pretty output for local runs, JSON for production, plus
//! a `warn_if_slow` wrapper used around anything that touches disk or
//! runs the flow solver.

use std::time::Duration;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

pub fn init_tracing(json: bool) {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let base = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE);

        if json {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(base.json())
                .try_init();
        } else {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(base.pretty())
                .try_init();
        }
    });
}

/// Runs `fut` and logs a warning if it takes longer than `max`.
///
/// Used around fixture/model loads and the flow solve, none of which
/// should stall a request-scoped caller for long.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}

/// Synchronous counterpart of `warn_if_slow`, for the CPU-bound solve
/// path which never awaits.
pub fn warn_if_slow_sync<T>(label: &'static str, max: Duration, f: impl FnOnce() -> T) -> T {
    let start = std::time::Instant::now();
    let out = f();
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}

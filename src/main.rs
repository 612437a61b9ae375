use std::sync::Arc;
use std::time::Duration;

use fitpulse::engine::RsvpOutcome;
use fitpulse::{Config, Engine};

/// Starts the fixed-cadence demo loop: each tick shocks one
/// opportunity's popularity, rebalances pulses, and solves assignment,
/// logging pulse movement so an operator can watch the market-maker
/// react — the closest in-process equivalent to the source's
/// interactive demo surface, minus the HTTP transport.
fn start_demo_loop(engine: Arc<Engine>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            let step = engine.demo_step(None);
            let Some(opp_id) = &step.shocked_opp_id else {
                tracing::warn!("demo loop has no opportunities to shock; stopping");
                break;
            };

            tracing::info!(opp_id, pulse_delta = step.pulse_delta, "demo tick: popularity shocked");

            match engine.rebalance(None, true, None, 3) {
                Ok(result) => {
                    tracing::info!(
                        assigned = result.solve.assignments.len(),
                        unassigned = result.solve.unassigned_user_ids.len(),
                        utilization = result.solve.metrics.utilization,
                        fairness_gap = result.solve.metrics.fairness_gap,
                        "demo tick: rebalanced"
                    );
                    for mover in &result.top_pulse_movers {
                        tracing::info!(
                            opp_id = mover.opp_id,
                            pulse = mover.pulse,
                            pulse_delta = mover.pulse_delta,
                            "top pulse mover"
                        );
                    }
                }
                Err(err) => tracing::error!(error = %err, "demo tick: rebalance failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    fitpulse::logger::init_tracing(is_production);

    tracing::info!("Starting fitpulse demo...");

    let config = Config::from_env();
    let engine = Arc::new(Engine::new(config));

    let seed = engine.demo_setup(50, 20);
    tracing::info!(num_users = seed.num_users, num_opps = seed.num_opps, "seeded synthetic population");

    if let Some(opp_id) = engine.state_snapshot().opps.first().map(|o| o.id.clone()) {
        if let Some(user_id) = engine.state_snapshot().users.first().map(|u| u.id.clone()) {
            match engine.rsvp(&opp_id, &user_id) {
                Ok(RsvpOutcome::Confirmed { spots_left }) => {
                    tracing::info!(opp_id, user_id, spots_left, "seed rsvp confirmed");
                }
                Ok(RsvpOutcome::Full) => tracing::info!(opp_id, user_id, "seed rsvp: event full"),
                Err(err) => tracing::warn!(error = %err, "seed rsvp failed"),
            }
        }
    }

    start_demo_loop(engine, Duration::from_millis(1500));

    tracing::info!("Demo loop started; waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    Ok(())
}

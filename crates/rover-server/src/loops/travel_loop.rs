//! Background travel loop.
//!
//! Advances the simulated clock at a fixed cadence and replays every tracked
//! vehicle's route, then persists the snapshot when anything changed.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::interval;

use rover_core::{RecordingNotifier, TickContext, TickOutcome};

use crate::config::Config;
use crate::persistence::save_snapshot;
use crate::state::AppState;

/// Counts of what one pass over all vehicles did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub advanced: usize,
    pub arrived: usize,
    pub blocked: usize,
    pub waiting: usize,
    pub failed: usize,
    /// Vehicles held back because they are under live control
    pub paused: usize,
}

impl PassSummary {
    /// Whether any vehicle's persisted state moved, including clock-only
    /// updates from blocked and paused vehicles.
    pub fn changed(&self) -> bool {
        self.advanced + self.arrived + self.blocked + self.waiting + self.failed + self.paused > 0
    }
}

pub async fn run_travel_loop(
    state: Arc<AppState>,
    config: Config,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(config.tick_interval());
    let step = config.simulated_seconds_per_tick();

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                persist(&state, &config).await;
                tracing::info!("Travel loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let now = state.advance_clock(step);
                let summary = pass_and_persist(&state, &config, now).await;
                if summary.arrived > 0 || summary.failed > 0 {
                    tracing::info!(?summary, universal_time = now, "travel pass");
                }
            }
        }
    }
}

/// Run one pass, then persist the snapshot if the pass or an API call
/// changed anything.
pub async fn pass_and_persist(state: &AppState, config: &Config, now: f64) -> PassSummary {
    let summary = travel_pass(state, now);
    if summary.changed() || state.take_dirty() {
        persist(state, config).await;
    }
    summary
}

/// Replay one tick for every vehicle, one after another.
///
/// A vehicle that cannot be ticked is logged and skipped; it never stops the
/// pass for the others.
pub fn travel_pass(state: &AppState, now: f64) -> PassSummary {
    let active = state.active_vehicle();
    let mut notifier = RecordingNotifier::default();
    let mut summary = PassSummary::default();

    for mut entry in state.vehicles().iter_mut() {
        let vehicle_id = entry.key().clone();
        let vehicle = entry.value_mut();

        let Some(body) = state.catalog().get(&vehicle.body_name) else {
            if vehicle.controller.state().active {
                tracing::warn!(vehicle = %vehicle_id, body = %vehicle.body_name, "tick skipped: unknown body");
                summary.failed += 1;
            }
            continue;
        };

        let ctx = TickContext {
            now,
            body,
            active_vehicle: active.as_ref(),
        };
        match vehicle.controller.update(&ctx, &mut vehicle.position, &mut notifier) {
            TickOutcome::Advanced { .. } => summary.advanced += 1,
            TickOutcome::Arrived => summary.arrived += 1,
            TickOutcome::Blocked => summary.blocked += 1,
            TickOutcome::Waiting => summary.waiting += 1,
            TickOutcome::RouteInvalid => {
                tracing::warn!(vehicle = %vehicle_id, "tick failed: route abandoned");
                summary.failed += 1;
            }
            TickOutcome::ActiveVehicle => summary.paused += 1,
            TickOutcome::Inactive => {}
        }
    }

    for advisory in &notifier.advisories {
        tracing::debug!("{advisory}");
    }
    state.record_arrivals(notifier.arrivals);
    summary
}

async fn persist(state: &AppState, config: &Config) {
    if let Err(err) = save_snapshot(&config.state_path, &state.snapshot()).await {
        tracing::warn!("Failed to persist travel state: {}", err);
    }
}

//! Headless travel replay.

use rover_core::{Body, NullNotifier, TickContext, TickOutcome, TravelController, VehiclePlacement};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Simulated seconds between ticks
    pub tick_seconds: f64,
    /// Give up after this many ticks
    pub max_ticks: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0,
            max_ticks: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    pub ticks: usize,
    pub simulated_seconds: f64,
    pub arrived: bool,
    pub distance_travelled_m: f64,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

impl VehiclePlacement for ReplaySummary {
    fn place(&mut self, lat: f64, lon: f64, altitude_m: f64) {
        self.lat = lat;
        self.lon = lon;
        self.altitude_m = altitude_m;
    }
}

/// Tick `controller` from time zero until it arrives or `max_ticks` runs out.
///
/// `on_tick` sees every outcome along with the simulated time.
pub fn replay<F>(
    controller: &mut TravelController,
    body: &Body,
    options: ReplayOptions,
    mut on_tick: F,
) -> ReplaySummary
where
    F: FnMut(f64, &TickOutcome),
{
    let mut summary = ReplaySummary::default();
    let mut notifier = NullNotifier;

    for tick in 0..options.max_ticks {
        let now = tick as f64 * options.tick_seconds;
        let ctx = TickContext {
            now,
            body,
            active_vehicle: None,
        };
        let outcome = controller.update(&ctx, &mut summary, &mut notifier);
        summary.ticks = tick + 1;
        summary.simulated_seconds = now;
        on_tick(now, &outcome);
        if outcome == TickOutcome::Arrived {
            summary.arrived = true;
            break;
        }
        if matches!(outcome, TickOutcome::Inactive | TickOutcome::RouteInvalid) {
            break;
        }
    }
    summary.distance_travelled_m = controller.state().distance_travelled_m;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_core::{
        ActivationRequest, FlatTerrain, Passability, TravelRules, VehicleSituation, VehicleSystems,
    };

    #[test]
    fn replay_runs_to_arrival() {
        let body = Body::new("Flat", 600_000.0, true, FlatTerrain(0.0));
        let mut controller = TravelController::new("r", "Rover", TravelRules::default());
        let total = controller
            .activate(&ActivationRequest {
                body: &body,
                lat: 0.0,
                lon: 0.0,
                altitude_m: 0.0,
                situation: VehicleSituation::Landed,
                systems: VehicleSystems {
                    average_speed_mps: 20.0,
                    ..VehicleSystems::default()
                },
                target_lat: 0.0,
                target_lon: 0.2,
                mode: Passability::Land,
            })
            .expect("activates");

        let mut advanced = 0;
        let summary = replay(&mut controller, &body, ReplayOptions::default(), |_, outcome| {
            if matches!(outcome, TickOutcome::Advanced { .. }) {
                advanced += 1;
            }
        });
        assert!(summary.arrived);
        assert_eq!(summary.distance_travelled_m, total);
        assert_eq!((summary.lat, summary.lon), (0.0, 0.2));
        // One waiting tick, then 20 m per tick.
        assert_eq!(summary.ticks, advanced + 2);
        assert_eq!(advanced, (total / 20.0).ceil() as usize - 1);
    }

    #[test]
    fn inactive_controller_stops_immediately() {
        let body = Body::new("Flat", 600_000.0, true, FlatTerrain(0.0));
        let mut controller = TravelController::new("r", "Rover", TravelRules::default());
        let summary = replay(&mut controller, &body, ReplayOptions::default(), |_, _| {});
        assert!(!summary.arrived);
        assert_eq!(summary.ticks, 1);
    }
}

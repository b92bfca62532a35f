//! Background travel: replays a planned route against simulated time.
//!
//! A controller owns one vehicle's travel state. The host calls
//! [`TravelController::update`] at a fixed cadence while the vehicle is not
//! under live control; each call converts elapsed time into distance and
//! moves the vehicle along the decoded route.

use crate::body::Body;
use crate::codec;
use crate::error::ActivationError;
use crate::geodesy::{destination_point, initial_bearing, terrain_height, world_distance};
use crate::models::{ActiveVehicle, Passability, VehicleSituation, VehicleSystems, WayPoint};
use crate::pathfinder::PathFinder;
use crate::rules::TravelRules;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelStatus {
    /// Waiting for the first tick, or not travelling
    #[default]
    Idle,
    Moving,
    Arrived,
    /// Systems failed; ticks are ignored until resumed
    Shutdown,
}

/// Per-vehicle travel progress. This is what gets persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelState {
    pub active: bool,
    pub status: TravelStatus,
    #[serde(default)]
    pub mode: Passability,
    pub distance_travelled_m: f64,
    pub distance_to_target_m: f64,
    /// Simulated time of the last processed tick
    pub last_updated: Option<f64>,
    /// Route in the transport-safe codec format
    pub encoded_path: Option<String>,
    pub target_lat: f64,
    pub target_lon: f64,
    pub average_speed_mps: f64,
    /// Height of the vehicle above the surface, kept while travelling
    #[serde(default)]
    pub height_offset_m: f64,
    /// Lattice step the route was planned with; 0 in snapshots that predate it
    #[serde(default)]
    pub step_size_m: f64,
}

impl TravelState {
    pub fn remaining_distance_m(&self) -> f64 {
        (self.distance_to_target_m - self.distance_travelled_m).max(0.0)
    }

    pub fn eta_seconds(&self) -> Option<f64> {
        if !self.active || self.average_speed_mps <= 0.0 {
            return None;
        }
        Some(self.remaining_distance_m() / self.average_speed_mps)
    }
}

/// Everything autopilot needs to know to plan and engage.
#[derive(Debug, Clone)]
pub struct ActivationRequest<'a> {
    pub body: &'a Body,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    pub situation: VehicleSituation,
    pub systems: VehicleSystems,
    pub target_lat: f64,
    pub target_lon: f64,
    pub mode: Passability,
}

/// Per-tick inputs from the host.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Current simulated time in seconds
    pub now: f64,
    /// The body the vehicle is on
    pub body: &'a Body,
    /// The vehicle under live player control, if any
    pub active_vehicle: Option<&'a ActiveVehicle>,
}

/// Relocates a vehicle's world representation.
pub trait VehiclePlacement {
    fn place(&mut self, lat: f64, lon: f64, altitude_m: f64);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalEvent {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub body_name: String,
    pub target_lat: f64,
    pub target_lon: f64,
    pub arrived_at: DateTime<Utc>,
    /// Whether the host should drop back to normal time rate
    pub reduce_time_warp: bool,
}

/// User-facing messages from the controller.
pub trait Notifier {
    fn arrived(&mut self, event: &ArrivalEvent);

    fn advisory(&mut self, _vehicle_name: &str, _message: &str) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn arrived(&mut self, _event: &ArrivalEvent) {}
}

/// Keeps every message, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub arrivals: Vec<ArrivalEvent>,
    pub advisories: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn arrived(&mut self, event: &ArrivalEvent) {
        self.arrivals.push(event.clone());
    }

    fn advisory(&mut self, vehicle_name: &str, message: &str) {
        self.advisories.push(format!("{vehicle_name}: {message}"));
    }
}

/// What one call to [`TravelController::update`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not travelling, or shut down
    Inactive,
    /// First tick recorded the clock; nothing moved
    Waiting,
    Advanced { lat: f64, lon: f64 },
    Arrived,
    /// Move refused near the active vehicle; retried next tick
    Blocked,
    /// The vehicle is under live control
    ActiveVehicle,
    /// The stored route was unusable and has been abandoned
    RouteInvalid,
}

#[derive(Debug, Clone)]
pub struct TravelController {
    vehicle_id: String,
    vehicle_name: String,
    state: TravelState,
    route: Vec<WayPoint>,
    rules: TravelRules,
}

impl TravelController {
    pub fn new(
        vehicle_id: impl Into<String>,
        vehicle_name: impl Into<String>,
        rules: TravelRules,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            vehicle_name: vehicle_name.into(),
            state: TravelState::default(),
            route: Vec::new(),
            rules,
        }
    }

    /// Rebuild a controller from persisted state.
    ///
    /// An undecodable route is treated as no route: travel is abandoned and
    /// the user has to set a new destination.
    pub fn restore(
        vehicle_id: impl Into<String>,
        vehicle_name: impl Into<String>,
        state: TravelState,
        rules: TravelRules,
    ) -> Self {
        let mut controller = Self::new(vehicle_id, vehicle_name, rules);
        controller.state = state;
        if !controller.state.active {
            return controller;
        }
        match codec::decode(controller.state.encoded_path.as_deref()) {
            Ok(route) if !route.is_empty() => controller.route = route,
            Ok(_) => {
                tracing::warn!(vehicle = %controller.vehicle_id, "active travel without a route");
                controller.abandon();
            }
            Err(err) => {
                tracing::warn!(vehicle = %controller.vehicle_id, "discarding stored route: {err}");
                controller.abandon();
            }
        }
        controller
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn vehicle_name(&self) -> &str {
        &self.vehicle_name
    }

    pub fn state(&self) -> &TravelState {
        &self.state
    }

    /// Decoded route in travel order.
    pub fn route(&self) -> &[WayPoint] {
        &self.route
    }

    pub fn rules(&self) -> &TravelRules {
        &self.rules
    }

    /// Check the vehicle, plan a route and engage autopilot.
    ///
    /// Returns the total route distance in meters.
    pub fn activate(&mut self, request: &ActivationRequest<'_>) -> Result<f64, ActivationError> {
        if self.state.active {
            return Err(ActivationError::AlreadyActive);
        }
        if !request.situation.permits(request.mode) {
            return Err(ActivationError::BadSituation {
                mode: request.mode,
                expected: match request.mode {
                    Passability::Land => "landed",
                    Passability::Ocean => "splashed down",
                    Passability::Amphibious | Passability::Any => "landed or splashed down",
                },
            });
        }
        check_systems(&request.systems)?;

        let mut finder = PathFinder::new(
            request.lat,
            request.lon,
            request.target_lat,
            request.target_lon,
            request.body.clone(),
            request.mode,
        )
        .with_rules(self.rules.clone());
        finder.find_path()?;

        let distance_m = finder.distance();
        self.route = finder.waypoints();
        self.state = TravelState {
            active: true,
            status: TravelStatus::Idle,
            mode: request.mode,
            distance_travelled_m: 0.0,
            distance_to_target_m: distance_m,
            last_updated: None,
            encoded_path: finder.encoded_path(),
            target_lat: request.target_lat,
            target_lon: request.target_lon,
            average_speed_mps: request.systems.average_speed_mps,
            height_offset_m: request.altitude_m
                - surface_altitude(request.lat, request.lon, request.body),
            step_size_m: self.rules.step_size_m,
        };

        tracing::info!(
            vehicle = %self.vehicle_id,
            body = %request.body.name,
            distance_m,
            waypoints = self.route.len(),
            tiles = finder.tiles_generated(),
            "autopilot engaged"
        );
        Ok(distance_m)
    }

    /// Abandon the route and reset all travel progress.
    pub fn deactivate(&mut self) {
        if self.state.active {
            tracing::info!(vehicle = %self.vehicle_id, "autopilot disengaged");
        }
        self.abandon();
    }

    /// Stop travelling without losing progress.
    pub fn shutdown(&mut self) {
        if self.state.active {
            self.state.status = TravelStatus::Shutdown;
            self.state.last_updated = None;
        }
    }

    pub fn resume(&mut self) {
        if self.state.active && self.state.status == TravelStatus::Shutdown {
            self.state.status = TravelStatus::Idle;
            self.state.last_updated = None;
        }
    }

    /// Advance the vehicle by the simulated time elapsed since the last tick.
    pub fn update(
        &mut self,
        ctx: &TickContext<'_>,
        placement: &mut dyn VehiclePlacement,
        notifier: &mut dyn Notifier,
    ) -> TickOutcome {
        if !self.state.active || self.state.status == TravelStatus::Shutdown {
            return TickOutcome::Inactive;
        }

        if ctx
            .active_vehicle
            .is_some_and(|active| active.vehicle_id == self.vehicle_id)
        {
            self.state.last_updated = None;
            notifier.advisory(
                &self.vehicle_name,
                "autopilot is paused while the vehicle is under direct control",
            );
            return TickOutcome::ActiveVehicle;
        }

        if self.route.is_empty() || !self.state.distance_to_target_m.is_finite() {
            tracing::warn!(vehicle = %self.vehicle_id, "abandoning travel with unusable route");
            self.abandon();
            return TickOutcome::RouteInvalid;
        }

        let Some(last_updated) = self.state.last_updated else {
            self.state.last_updated = Some(ctx.now);
            return TickOutcome::Waiting;
        };
        let elapsed = (ctx.now - last_updated).max(0.0);
        self.state.last_updated = Some(ctx.now);

        let delta = elapsed * self.state.average_speed_mps;
        self.state.distance_travelled_m += delta;

        if self.state.distance_travelled_m >= self.state.distance_to_target_m {
            let (lat, lon) = (self.state.target_lat, self.state.target_lon);
            if !self.move_safely(lat, lon, ctx, placement) {
                self.state.distance_travelled_m -= delta;
                self.state.status = TravelStatus::Moving;
                return TickOutcome::Blocked;
            }
            self.arrive(ctx.body, notifier);
            return TickOutcome::Arrived;
        }

        let (lat, lon) = self.position_along_route(self.state.distance_travelled_m, ctx.body);
        if !self.move_safely(lat, lon, ctx, placement) {
            self.state.distance_travelled_m -= delta;
            return TickOutcome::Blocked;
        }
        self.state.status = TravelStatus::Moving;
        TickOutcome::Advanced { lat, lon }
    }

    /// Coordinate reached after travelling `travelled_m` along the route.
    pub fn position_along_route(&self, travelled_m: f64, body: &Body) -> (f64, f64) {
        let Some(last_index) = self.route.len().checked_sub(1) else {
            return (self.state.target_lat, self.state.target_lon);
        };
        let step = self.route_step_m();
        let index = ((travelled_m.max(0.0) / step).floor() as usize).min(last_index);
        let remainder = travelled_m - index as f64 * step;

        let from = self.route[index];
        let (to_lat, to_lon) = match self.route.get(index + 1) {
            Some(next) => (next.lat, next.lon),
            None => (self.state.target_lat, self.state.target_lon),
        };
        let bearing = initial_bearing(from.lat, from.lon, to_lat, to_lon);
        destination_point(from.lat, from.lon, bearing, remainder, body.radius_m)
    }

    /// Spacing of the route's waypoints, as recorded when it was planned.
    fn route_step_m(&self) -> f64 {
        let recorded = self.state.step_size_m;
        if recorded.is_finite() && recorded > 0.0 {
            recorded
        } else {
            self.rules.step_size_m
        }
    }

    fn move_safely(
        &self,
        lat: f64,
        lon: f64,
        ctx: &TickContext<'_>,
        placement: &mut dyn VehiclePlacement,
    ) -> bool {
        let altitude_m = surface_altitude(lat, lon, ctx.body) + self.state.height_offset_m;
        if let Some(active) = ctx.active_vehicle {
            if active.body_name == ctx.body.name {
                let separation = world_distance(
                    (lat, lon, altitude_m),
                    (active.lat, active.lon, active.altitude_m),
                    ctx.body.radius_m,
                );
                if separation < self.rules.proximity_threshold_m {
                    tracing::debug!(
                        vehicle = %self.vehicle_id,
                        separation_m = separation,
                        "move deferred near the active vehicle"
                    );
                    return false;
                }
            }
        }
        placement.place(lat, lon, altitude_m);
        true
    }

    fn arrive(&mut self, body: &Body, notifier: &mut dyn Notifier) {
        self.state.distance_travelled_m = self.state.distance_to_target_m;
        self.state.status = TravelStatus::Arrived;
        self.state.active = false;
        self.state.encoded_path = None;
        self.state.last_updated = None;
        self.route.clear();

        let event = ArrivalEvent {
            vehicle_id: self.vehicle_id.clone(),
            vehicle_name: self.vehicle_name.clone(),
            body_name: body.name.clone(),
            target_lat: self.state.target_lat,
            target_lon: self.state.target_lon,
            arrived_at: Utc::now(),
            reduce_time_warp: self.rules.reduce_time_warp_on_arrival,
        };
        tracing::info!(
            vehicle = %self.vehicle_id,
            body = %body.name,
            lat = event.target_lat,
            lon = event.target_lon,
            "vehicle arrived"
        );
        notifier.arrived(&event);
    }

    fn abandon(&mut self) {
        self.state = TravelState::default();
        self.route.clear();
    }
}

fn check_systems(systems: &VehicleSystems) -> Result<(), ActivationError> {
    let speed = systems.average_speed_mps;
    if !(speed.is_finite() && speed > 0.0) {
        return Err(ActivationError::NotMoving(speed));
    }
    if systems.power_required_w > systems.power_available_w {
        return Err(ActivationError::NoPower {
            required_w: systems.power_required_w,
            available_w: systems.power_available_w,
        });
    }
    Ok(())
}

/// Height a surface vehicle rests at: the terrain, or sea level over water.
pub fn surface_altitude(lat: f64, lon: f64, body: &Body) -> f64 {
    let height = terrain_height(lat, lon, body);
    if body.has_ocean && height < 0.0 {
        0.0
    } else {
        height
    }
}

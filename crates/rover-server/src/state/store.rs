//! In-memory state store using DashMap.

use dashmap::DashMap;
use rover_core::controller::surface_altitude;
use rover_core::{
    ActivationError, ActivationRequest, ActiveVehicle, ArrivalEvent, BodyCatalog, Passability,
    TravelController, TravelRules, TravelState, VehiclePlacement, VehicleSituation,
    VehicleSystems,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use thiserror::Error;

use crate::config::Config;
use crate::persistence::{Snapshot, VehicleRecord};

/// Arrivals kept for `GET /v1/arrivals`.
const MAX_ARRIVALS: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown body: {0}")]
    UnknownBody(String),

    #[error("unknown vehicle: {0}")]
    UnknownVehicle(String),

    #[error("vehicle already registered: {0}")]
    DuplicateVehicle(String),

    #[error(transparent)]
    Activation(#[from] ActivationError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehiclePosition {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

impl VehiclePlacement for VehiclePosition {
    fn place(&mut self, lat: f64, lon: f64, altitude_m: f64) {
        self.lat = lat;
        self.lon = lon;
        self.altitude_m = altitude_m;
    }
}

/// A registered vehicle and its travel controller.
#[derive(Debug, Clone)]
pub struct TrackedVehicle {
    pub name: String,
    pub body_name: String,
    pub situation: VehicleSituation,
    pub position: VehiclePosition,
    pub controller: TravelController,
}

impl TrackedVehicle {
    fn view(&self, active_id: Option<&str>) -> VehicleView {
        let travel = self.controller.state().clone();
        VehicleView {
            vehicle_id: self.controller.vehicle_id().to_string(),
            name: self.name.clone(),
            body_name: self.body_name.clone(),
            lat: self.position.lat,
            lon: self.position.lon,
            altitude_m: self.position.altitude_m,
            situation: self.situation,
            remaining_distance_m: travel.remaining_distance_m(),
            eta_seconds: travel.eta_seconds(),
            is_active: active_id == Some(self.controller.vehicle_id()),
            travel,
        }
    }

    fn record(&self) -> VehicleRecord {
        VehicleRecord {
            vehicle_id: self.controller.vehicle_id().to_string(),
            name: self.name.clone(),
            body_name: self.body_name.clone(),
            lat: self.position.lat,
            lon: self.position.lon,
            altitude_m: self.position.altitude_m,
            situation: self.situation,
            travel: self.controller.state().clone(),
        }
    }
}

/// API view of a tracked vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleView {
    pub vehicle_id: String,
    pub name: String,
    pub body_name: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    pub situation: VehicleSituation,
    pub travel: TravelState,
    pub remaining_distance_m: f64,
    pub eta_seconds: Option<f64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub vehicle_id: String,
    pub name: Option<String>,
    pub body_name: String,
    pub lat: f64,
    pub lon: f64,
    /// Defaults to resting on the surface
    pub altitude_m: Option<f64>,
    #[serde(default)]
    pub situation: VehicleSituation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutopilotRequest {
    pub target_lat: f64,
    pub target_lon: f64,
    #[serde(default)]
    pub mode: Passability,
    pub systems: VehicleSystems,
}

/// Application state - thread-safe store for vehicles and the simulated clock.
pub struct AppState {
    catalog: BodyCatalog,
    rules: TravelRules,
    vehicles: DashMap<String, TrackedVehicle>,
    active_vehicle: RwLock<Option<String>>,
    universal_time: Mutex<f64>,
    arrivals: Mutex<Vec<ArrivalEvent>>,
    dirty: AtomicBool,
}

impl AppState {
    pub fn new(catalog: BodyCatalog, rules: TravelRules) -> Self {
        Self {
            catalog,
            rules,
            vehicles: DashMap::new(),
            active_vehicle: RwLock::new(None),
            universal_time: Mutex::new(0.0),
            arrivals: Mutex::new(Vec::new()),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(BodyCatalog::standard(config.terrain_seed), config.rules.clone())
    }

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &TravelRules {
        &self.rules
    }

    pub fn vehicles(&self) -> &DashMap<String, TrackedVehicle> {
        &self.vehicles
    }

    pub fn universal_time(&self) -> f64 {
        *self.universal_time.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance the simulated clock and return the new time.
    pub fn advance_clock(&self, seconds: f64) -> f64 {
        let mut now = self.universal_time.lock().unwrap_or_else(PoisonError::into_inner);
        *now += seconds.max(0.0);
        *now
    }

    pub fn register_vehicle(&self, new: NewVehicle) -> Result<VehicleView, StoreError> {
        let body = self
            .catalog
            .get(&new.body_name)
            .ok_or_else(|| StoreError::UnknownBody(new.body_name.clone()))?;
        if self.vehicles.contains_key(&new.vehicle_id) {
            return Err(StoreError::DuplicateVehicle(new.vehicle_id));
        }

        let name = new.name.unwrap_or_else(|| new.vehicle_id.clone());
        let vehicle = TrackedVehicle {
            controller: TravelController::new(new.vehicle_id.clone(), name.clone(), self.rules.clone()),
            name,
            body_name: body.name.clone(),
            situation: new.situation,
            position: VehiclePosition {
                lat: new.lat,
                lon: new.lon,
                altitude_m: new
                    .altitude_m
                    .unwrap_or_else(|| surface_altitude(new.lat, new.lon, body)),
            },
        };
        let view = vehicle.view(self.active_vehicle_id().as_deref());
        self.vehicles.insert(new.vehicle_id, vehicle);
        self.mark_dirty();
        Ok(view)
    }

    pub fn get_vehicle(&self, vehicle_id: &str) -> Option<VehicleView> {
        let active_id = self.active_vehicle_id();
        self.vehicles
            .get(vehicle_id)
            .map(|vehicle| vehicle.view(active_id.as_deref()))
    }

    pub fn list_vehicles(&self) -> Vec<VehicleView> {
        let active_id = self.active_vehicle_id();
        let mut views: Vec<VehicleView> = self
            .vehicles
            .iter()
            .map(|vehicle| vehicle.view(active_id.as_deref()))
            .collect();
        views.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id));
        views
    }

    /// Plan a route and engage autopilot.
    ///
    /// Planning runs on a copy of the controller so the vehicle map is not
    /// locked during the search.
    pub fn activate_autopilot(
        &self,
        vehicle_id: &str,
        request: &AutopilotRequest,
    ) -> Result<VehicleView, StoreError> {
        let (mut controller, body_name, position, situation) = {
            let vehicle = self
                .vehicles
                .get(vehicle_id)
                .ok_or_else(|| StoreError::UnknownVehicle(vehicle_id.to_string()))?;
            (
                vehicle.controller.clone(),
                vehicle.body_name.clone(),
                vehicle.position,
                vehicle.situation,
            )
        };
        let body = self
            .catalog
            .get(&body_name)
            .ok_or(StoreError::UnknownBody(body_name))?;

        controller.activate(&ActivationRequest {
            body,
            lat: position.lat,
            lon: position.lon,
            altitude_m: position.altitude_m,
            situation,
            systems: request.systems,
            target_lat: request.target_lat,
            target_lon: request.target_lon,
            mode: request.mode,
        })?;

        let active_id = self.active_vehicle_id();
        let mut vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or_else(|| StoreError::UnknownVehicle(vehicle_id.to_string()))?;
        if vehicle.controller.state().active {
            return Err(ActivationError::AlreadyActive.into());
        }
        vehicle.controller = controller;
        let view = vehicle.view(active_id.as_deref());
        drop(vehicle);
        self.mark_dirty();
        Ok(view)
    }

    pub fn deactivate_autopilot(&self, vehicle_id: &str) -> Result<VehicleView, StoreError> {
        let active_id = self.active_vehicle_id();
        let mut vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or_else(|| StoreError::UnknownVehicle(vehicle_id.to_string()))?;
        vehicle.controller.deactivate();
        let view = vehicle.view(active_id.as_deref());
        drop(vehicle);
        self.mark_dirty();
        Ok(view)
    }

    /// Put a vehicle under live control, optionally moving it first.
    pub fn set_active_vehicle(
        &self,
        vehicle_id: &str,
        position: Option<VehiclePosition>,
    ) -> Result<ActiveVehicle, StoreError> {
        let active = {
            let mut vehicle = self
                .vehicles
                .get_mut(vehicle_id)
                .ok_or_else(|| StoreError::UnknownVehicle(vehicle_id.to_string()))?;
            if let Some(position) = position {
                vehicle.position = position;
            }
            active_from(vehicle_id, &vehicle)
        };
        if let Ok(mut slot) = self.active_vehicle.write() {
            *slot = Some(vehicle_id.to_string());
        }
        self.mark_dirty();
        Ok(active)
    }

    pub fn clear_active_vehicle(&self) {
        if let Ok(mut slot) = self.active_vehicle.write() {
            *slot = None;
        }
    }

    pub fn active_vehicle_id(&self) -> Option<String> {
        self.active_vehicle
            .read()
            .map(|slot| slot.clone())
            .unwrap_or_default()
    }

    pub fn active_vehicle(&self) -> Option<ActiveVehicle> {
        let vehicle_id = self.active_vehicle_id()?;
        self.vehicles
            .get(&vehicle_id)
            .map(|vehicle| active_from(&vehicle_id, &vehicle))
    }

    pub fn record_arrivals(&self, events: Vec<ArrivalEvent>) {
        if events.is_empty() {
            return;
        }
        let mut arrivals = self.arrivals.lock().unwrap_or_else(PoisonError::into_inner);
        arrivals.extend(events);
        let excess = arrivals.len().saturating_sub(MAX_ARRIVALS);
        arrivals.drain(..excess);
    }

    /// Arrivals, most recent first.
    pub fn arrivals(&self) -> Vec<ArrivalEvent> {
        let arrivals = self.arrivals.lock().unwrap_or_else(PoisonError::into_inner);
        arrivals.iter().rev().cloned().collect()
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Whether anything changed since the last call.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut vehicles: Vec<VehicleRecord> =
            self.vehicles.iter().map(|vehicle| vehicle.record()).collect();
        vehicles.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id));
        Snapshot {
            universal_time: self.universal_time(),
            vehicles,
        }
    }

    /// Replace all vehicles and the clock with a saved snapshot.
    pub fn restore(&self, snapshot: Snapshot) {
        self.vehicles.clear();
        for record in snapshot.vehicles {
            if self.catalog.get(&record.body_name).is_none() {
                tracing::warn!(vehicle = %record.vehicle_id, body = %record.body_name, "restored vehicle is on an unknown body");
            }
            let controller = TravelController::restore(
                record.vehicle_id.clone(),
                record.name.clone(),
                record.travel,
                self.rules.clone(),
            );
            self.vehicles.insert(
                record.vehicle_id,
                TrackedVehicle {
                    name: record.name,
                    body_name: record.body_name,
                    situation: record.situation,
                    position: VehiclePosition {
                        lat: record.lat,
                        lon: record.lon,
                        altitude_m: record.altitude_m,
                    },
                    controller,
                },
            );
        }
        *self.universal_time.lock().unwrap_or_else(PoisonError::into_inner) =
            snapshot.universal_time;
    }
}

fn active_from(vehicle_id: &str, vehicle: &TrackedVehicle) -> ActiveVehicle {
    ActiveVehicle {
        vehicle_id: vehicle_id.to_string(),
        body_name: vehicle.body_name.clone(),
        lat: vehicle.position.lat,
        lon: vehicle.position.lon,
        altitude_m: vehicle.position.altitude_m,
    }
}

//! REST API routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use rover_core::{ActivationError, ArrivalEvent, RouteError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::state::{AppState, AutopilotRequest, NewVehicle, StoreError, VehiclePosition, VehicleView};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/bodies", get(list_bodies))
        .route("/v1/vehicles", get(list_vehicles).post(register_vehicle))
        .route("/v1/vehicles/:vehicle_id", get(get_vehicle))
        .route(
            "/v1/vehicles/:vehicle_id/autopilot",
            post(activate_autopilot).delete(deactivate_autopilot),
        )
        .route(
            "/v1/active-vehicle",
            put(set_active_vehicle).delete(clear_active_vehicle),
        )
        .route("/v1/arrivals", get(list_arrivals))
}

#[derive(Debug, Serialize)]
struct BodyInfo {
    name: String,
    radius_m: f64,
    has_ocean: bool,
    has_surface: bool,
}

async fn list_bodies(State(state): State<Arc<AppState>>) -> Json<Vec<BodyInfo>> {
    Json(
        state
            .catalog()
            .iter()
            .map(|body| BodyInfo {
                name: body.name.clone(),
                radius_m: body.radius_m,
                has_ocean: body.has_ocean,
                has_surface: body.has_surface,
            })
            .collect(),
    )
}

async fn list_vehicles(State(state): State<Arc<AppState>>) -> Json<Vec<VehicleView>> {
    Json(state.list_vehicles())
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<VehicleView>, StatusCode> {
    state.get_vehicle(&vehicle_id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn register_vehicle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewVehicle>,
) -> impl IntoResponse {
    match state.register_vehicle(req) {
        Ok(view) => (StatusCode::CREATED, Json(json!(view))),
        Err(err) => error_response(&err),
    }
}

async fn activate_autopilot(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
    Json(req): Json<AutopilotRequest>,
) -> impl IntoResponse {
    // Route search is CPU bound and may run for the whole search budget.
    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        worker_state.activate_autopilot(&vehicle_id, &req)
    })
    .await;

    match result {
        Ok(Ok(view)) => (StatusCode::OK, Json(json!(view))),
        Ok(Err(err)) => error_response(&err),
        Err(err) => {
            tracing::warn!("Autopilot planning task failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Route planning failed" })),
            )
        }
    }
}

async fn deactivate_autopilot(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
) -> impl IntoResponse {
    match state.deactivate_autopilot(&vehicle_id) {
        Ok(view) => (StatusCode::OK, Json(json!(view))),
        Err(err) => error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
struct ActiveVehicleRequest {
    vehicle_id: String,
    lat: Option<f64>,
    lon: Option<f64>,
    altitude_m: Option<f64>,
}

async fn set_active_vehicle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActiveVehicleRequest>,
) -> impl IntoResponse {
    let position = match (req.lat, req.lon) {
        (Some(lat), Some(lon)) => Some(VehiclePosition {
            lat,
            lon,
            altitude_m: req.altitude_m.unwrap_or(0.0),
        }),
        (None, None) => None,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "lat and lon must be given together" })),
            );
        }
    };

    match state.set_active_vehicle(&req.vehicle_id, position) {
        Ok(active) => (StatusCode::OK, Json(json!(active))),
        Err(err) => error_response(&err),
    }
}

async fn clear_active_vehicle(State(state): State<Arc<AppState>>) -> StatusCode {
    state.clear_active_vehicle();
    StatusCode::NO_CONTENT
}

async fn list_arrivals(State(state): State<Arc<AppState>>) -> Json<Vec<ArrivalEvent>> {
    Json(state.arrivals())
}

fn error_response(err: &StoreError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        StoreError::UnknownVehicle(_) => StatusCode::NOT_FOUND,
        StoreError::UnknownBody(_) => StatusCode::BAD_REQUEST,
        StoreError::DuplicateVehicle(_) => StatusCode::CONFLICT,
        StoreError::Activation(ActivationError::AlreadyActive) => StatusCode::CONFLICT,
        StoreError::Activation(ActivationError::Route(RouteError::Search(_))) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        StoreError::Activation(ActivationError::Route(RouteError::InvalidStepSize(_))) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        StoreError::Activation(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

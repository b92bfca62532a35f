use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rover_core::{BodyCatalog, FlatTerrain, TravelRules};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, loops::travel_loop::travel_pass, state::AppState};

fn setup_app() -> (axum::Router, Arc<AppState>) {
    let mut catalog = BodyCatalog::default();
    catalog.insert(rover_core::Body::new("Flat", 600_000.0, true, FlatTerrain(0.0)));
    let state = Arc::new(AppState::new(catalog, TravelRules::default()));
    let app = api::routes().with_state(state.clone());
    (app, state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &axum::Router, vehicle_id: &str) -> Value {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/vehicles",
            json!({
                "vehicle_id": vehicle_id,
                "name": "Test Rover",
                "body_name": "Flat",
                "lat": 0.0,
                "lon": 0.0
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    read_json(res).await
}

#[tokio::test]
async fn health_and_bodies() {
    let (app, _state) = setup_app();

    let res = app.clone().oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(empty_request("GET", "/v1/bodies")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bodies = read_json(res).await;
    assert_eq!(bodies[0]["name"], "Flat");
    assert_eq!(bodies[0]["has_ocean"], true);
}

#[tokio::test]
async fn register_and_fetch_vehicle() {
    let (app, _state) = setup_app();
    let created = register(&app, "rover-1").await;
    assert_eq!(created["vehicle_id"], "rover-1");
    assert_eq!(created["travel"]["status"], "idle");

    let res = app.clone().oneshot(empty_request("GET", "/v1/vehicles/rover-1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["name"], "Test Rover");

    let res = app.clone().oneshot(empty_request("GET", "/v1/vehicles/missing")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let duplicate = json_request(
        "POST",
        "/v1/vehicles",
        json!({ "vehicle_id": "rover-1", "body_name": "Flat", "lat": 0.0, "lon": 0.0 }),
    );
    let res = app.clone().oneshot(duplicate).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn autopilot_lifecycle() {
    let (app, state) = setup_app();
    register(&app, "rover-1").await;

    let engage = json!({
        "target_lat": 0.0,
        "target_lon": 0.2,
        "mode": "land",
        "systems": { "average_speed_mps": 50.0 }
    });
    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/vehicles/rover-1/autopilot", engage.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view = read_json(res).await;
    assert_eq!(view["travel"]["active"], true);
    assert!(view["travel"]["encoded_path"].is_string());

    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/vehicles/rover-1/autopilot", engage))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    for tick in 0..100 {
        travel_pass(&state, tick as f64);
    }
    let res = app.clone().oneshot(empty_request("GET", "/v1/arrivals")).await.unwrap();
    let arrivals = read_json(res).await;
    assert_eq!(arrivals.as_array().map(Vec::len), Some(1));
    assert_eq!(arrivals[0]["vehicle_id"], "rover-1");

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", "/v1/vehicles/rover-1/autopilot"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["travel"]["active"], false);
}

#[tokio::test]
async fn autopilot_rejects_bad_requests() {
    let (app, _state) = setup_app();
    register(&app, "rover-1").await;

    let too_close = json!({
        "target_lat": 0.0,
        "target_lon": 0.0001,
        "systems": { "average_speed_mps": 5.0 }
    });
    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/vehicles/rover-1/autopilot", too_close))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(read_json(res).await["error"].as_str().unwrap().contains("closer than one"));

    let stopped = json!({
        "target_lat": 0.0,
        "target_lon": 0.2,
        "systems": { "average_speed_mps": 0.0 }
    });
    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/vehicles/rover-1/autopilot", stopped))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let unknown = json!({
        "target_lat": 0.0,
        "target_lon": 0.2,
        "systems": { "average_speed_mps": 5.0 }
    });
    let res = app
        .clone()
        .oneshot(json_request("POST", "/v1/vehicles/ghost/autopilot", unknown))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn active_vehicle_round_trip() {
    let (app, state) = setup_app();
    register(&app, "rover-1").await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/v1/active-vehicle",
            json!({ "vehicle_id": "rover-1", "lat": 0.5, "lon": 0.5, "altitude_m": 2.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["lat"], 0.5);
    assert_eq!(state.active_vehicle_id().as_deref(), Some("rover-1"));

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/v1/active-vehicle",
            json!({ "vehicle_id": "rover-1", "lat": 0.5 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(empty_request("DELETE", "/v1/active-vehicle"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(state.active_vehicle_id().is_none());
}

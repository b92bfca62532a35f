//! End-to-end travel scenarios: plan on a body, persist the state, restore it
//! and replay until arrival.

use rover_core::geodesy::distance;
use rover_core::{
    codec, ActivationRequest, Body, FlatTerrain, Passability, PathFinder, RecordingNotifier,
    TickContext, TickOutcome, TravelController, TravelRules, TravelState, TravelStatus,
    VehiclePlacement, VehicleSituation, VehicleSystems,
};

#[derive(Default)]
struct Position {
    lat: f64,
    lon: f64,
    altitude_m: f64,
    moves: usize,
}

impl VehiclePlacement for Position {
    fn place(&mut self, lat: f64, lon: f64, altitude_m: f64) {
        self.lat = lat;
        self.lon = lon;
        self.altitude_m = altitude_m;
        self.moves += 1;
    }
}

fn kerbin_like() -> Body {
    Body::new("Terra", 600_000.0, true, FlatTerrain(0.0))
}

#[test]
fn planned_route_round_trips_through_codec() {
    let body = kerbin_like();
    let mut finder = PathFinder::new(0.0, 0.0, 0.0, 0.2, body.clone(), Passability::Land);
    finder.find_path().expect("route");

    let truth = distance(0.0, 0.0, 0.0, 0.2, body.radius_m);
    assert!((finder.distance() - truth).abs() < 1000.0);

    let encoded = finder.encoded_path().expect("encoded route");
    let decoded = codec::decode(Some(&encoded)).expect("decodes");
    assert_eq!(decoded, finder.waypoints());
    assert_eq!((decoded[0].lat, decoded[0].lon), (0.0, 0.0));
}

#[test]
fn persisted_travel_resumes_and_arrives() {
    let body = kerbin_like();
    let mut controller = TravelController::new("rover-7", "Rover Seven", TravelRules::default());
    let total_m = controller
        .activate(&ActivationRequest {
            body: &body,
            lat: 0.0,
            lon: 0.0,
            altitude_m: 2.0,
            situation: VehicleSituation::Landed,
            systems: VehicleSystems {
                average_speed_mps: 5.0,
                power_required_w: 1.0,
                power_available_w: 1.0,
            },
            target_lat: 0.0,
            target_lon: 0.2,
            mode: Passability::Land,
        })
        .expect("activates");

    let mut position = Position::default();
    let mut notifier = RecordingNotifier::default();
    let tick = |now| TickContext {
        now,
        body: &body,
        active_vehicle: None,
    };

    controller.update(&tick(0.0), &mut position, &mut notifier);
    controller.update(&tick(100.0), &mut position, &mut notifier);
    assert_eq!(controller.state().distance_travelled_m, 500.0);

    // Save and reload, as a host would across sessions.
    let json = serde_json::to_string(controller.state()).expect("serializes");
    let saved: TravelState = serde_json::from_str(&json).expect("deserializes");
    let mut controller =
        TravelController::restore("rover-7", "Rover Seven", saved, TravelRules::default());
    assert_eq!(controller.route().len(), 3);

    let mut now = 100.0;
    let mut outcome = TickOutcome::Waiting;
    while outcome != TickOutcome::Arrived {
        now += 10.0;
        outcome = controller.update(&tick(now), &mut position, &mut notifier);
        assert!(now < 10_000.0, "vehicle never arrived");
    }

    assert_eq!(controller.state().status, TravelStatus::Arrived);
    assert_eq!(controller.state().distance_travelled_m, total_m);
    assert_eq!((position.lat, position.lon), (0.0, 0.2));
    assert_eq!(position.altitude_m, 2.0);
    assert_eq!(notifier.arrivals.len(), 1);
    assert_eq!(notifier.arrivals[0].vehicle_id, "rover-7");
}

//! Route planning on a catalog body.

use anyhow::{anyhow, Context, Result};
use rover_core::geodesy::distance;
use rover_core::{BodyCatalog, Passability, PathFinder, TravelRules, WayPoint};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub body_name: String,
    pub start_lat: f64,
    pub start_lon: f64,
    pub target_lat: f64,
    pub target_lon: f64,
    pub mode: Passability,
    pub rules: TravelRules,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub body: String,
    pub mode: Passability,
    pub distance_m: f64,
    /// Great-circle distance, for comparison
    pub straight_line_m: f64,
    pub tiles_generated: usize,
    pub nodes_expanded: usize,
    pub waypoints: Vec<WayPoint>,
    pub encoded_path: Option<String>,
}

pub fn plan_route(catalog: &BodyCatalog, request: &PlanRequest) -> Result<RouteReport> {
    let body = catalog
        .get(&request.body_name)
        .ok_or_else(|| anyhow!("unknown body: {}", request.body_name))?;

    let mut finder = PathFinder::new(
        request.start_lat,
        request.start_lon,
        request.target_lat,
        request.target_lon,
        body.clone(),
        request.mode,
    )
    .with_rules(request.rules.clone());
    finder
        .find_path()
        .with_context(|| format!("planning a {} route on {}", request.mode, body.name))?;

    Ok(RouteReport {
        body: body.name.clone(),
        mode: request.mode,
        distance_m: finder.distance(),
        straight_line_m: distance(
            request.start_lat,
            request.start_lon,
            request.target_lat,
            request.target_lon,
            body.radius_m,
        ),
        tiles_generated: finder.tiles_generated(),
        nodes_expanded: finder.nodes_expanded(),
        waypoints: finder.waypoints(),
        encoded_path: finder.encoded_path(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_core::{Body, FlatTerrain};

    fn catalog() -> BodyCatalog {
        let mut catalog = BodyCatalog::default();
        catalog.insert(Body::new("Flat", 600_000.0, true, FlatTerrain(0.0)));
        catalog
    }

    fn request(body_name: &str, target_lon: f64) -> PlanRequest {
        PlanRequest {
            body_name: body_name.to_string(),
            start_lat: 0.0,
            start_lon: 0.0,
            target_lat: 0.0,
            target_lon,
            mode: Passability::Land,
            rules: TravelRules::default(),
        }
    }

    #[test]
    fn report_describes_the_route() {
        let report = plan_route(&catalog(), &request("flat", 0.2)).expect("plans");
        assert_eq!(report.body, "Flat");
        assert_eq!(report.waypoints.len(), 3);
        assert!(report.encoded_path.is_some());
        assert!((report.distance_m - report.straight_line_m).abs() < 1000.0);
    }

    #[test]
    fn failures_carry_context() {
        let err = plan_route(&catalog(), &request("Nowhere", 0.2)).unwrap_err();
        assert!(err.to_string().contains("unknown body"));

        let err = plan_route(&catalog(), &request("Flat", 0.001)).unwrap_err();
        assert!(err.to_string().contains("planning a land route on Flat"));
    }
}

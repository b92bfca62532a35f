//! Lazily generated hex lattice over a body's surface, plus the route search
//! that runs on it.
//!
//! Tiles are projected one step at a time from existing tiles along six
//! bearings 60 degrees apart. Each tile's frame follows the heading it was
//! reached with, so the lattice bends with the great circle instead of a
//! fixed compass frame.

use crate::astar::{self, Deadline, Neighbours, Path, SearchBudget};
use crate::body::Body;
use crate::codec;
use crate::error::{RouteError, SearchError};
use crate::geodesy::{
    destination_point, distance, final_bearing, initial_bearing, normalize_bearing,
    terrain_height,
};
use crate::hex::{Direction, Hex, HexCoord, DIRECTIONS};
use crate::models::{Passability, WayPoint};
use crate::rules::TravelRules;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the tiles generated for one route request and the path found on them.
#[derive(Debug)]
pub struct PathFinder {
    start_lat: f64,
    start_lon: f64,
    target_lat: f64,
    target_lon: f64,
    body: Body,
    mode: Passability,
    rules: TravelRules,
    tiles: HashMap<HexCoord, Hex>,
    path: Option<Arc<Path<Hex>>>,
    expansions: usize,
}

impl PathFinder {
    pub fn new(
        start_lat: f64,
        start_lon: f64,
        target_lat: f64,
        target_lon: f64,
        body: Body,
        mode: Passability,
    ) -> Self {
        Self {
            start_lat,
            start_lon,
            target_lat,
            target_lon,
            body,
            mode,
            rules: TravelRules::default(),
            tiles: HashMap::new(),
            path: None,
            expansions: 0,
        }
    }

    pub fn with_rules(mut self, rules: TravelRules) -> Self {
        self.rules = rules;
        self
    }

    /// Search for a route under the wall-clock budget from the rules.
    pub fn find_path(&mut self) -> Result<(), RouteError> {
        let mut deadline = Deadline::after(self.rules.search_budget());
        self.find_path_with_budget(&mut deadline)
    }

    /// Search for a route, giving up when `budget` runs out.
    ///
    /// On any error [`PathFinder::path`] stays `None`.
    pub fn find_path_with_budget<B>(&mut self, budget: &mut B) -> Result<(), RouteError>
    where
        B: SearchBudget + ?Sized,
    {
        self.path = None;
        self.tiles.clear();
        self.expansions = 0;

        let step = self.rules.step_size_m;
        if !(step.is_finite() && step > 0.0) {
            return Err(RouteError::InvalidStepSize(step));
        }
        let radius = self.body.radius_m;
        let (target_lat, target_lon) = (self.target_lat, self.target_lon);
        let total = distance(self.start_lat, self.start_lon, target_lat, target_lon, radius);
        if total < step {
            return Err(RouteError::TargetTooClose {
                distance_m: total,
                step_size_m: step,
            });
        }

        let bearing = initial_bearing(self.start_lat, self.start_lon, target_lat, target_lon);
        let start = Hex {
            lat: self.start_lat,
            lon: self.start_lon,
            altitude_m: terrain_height(self.start_lat, self.start_lon, &self.body),
            bearing_deg: bearing,
            coord: HexCoord::ORIGIN,
        };
        self.tiles.insert(start.coord, start);

        let destination = self.seed_straight_line(start, total, budget)?;
        tracing::debug!(
            body = %self.body.name,
            mode = %self.mode,
            distance_m = total,
            destination = ?destination.coord,
            "starting route search"
        );

        let result = astar::find_path(
            self,
            start,
            &destination,
            |_, _| step,
            |tile| distance(tile.lat, tile.lon, target_lat, target_lon, radius),
            budget,
        );

        match result {
            Ok(path) => {
                tracing::debug!(
                    steps = path.len(),
                    cost_m = path.total_cost(),
                    tiles = self.tiles.len(),
                    expanded = self.expansions,
                    "route found"
                );
                self.path = Some(path);
                Ok(())
            }
            Err(SearchError::Exhausted) => {
                tracing::debug!(tiles = self.tiles.len(), "no route within passability policy");
                Err(RouteError::NoRoute { mode: self.mode })
            }
            Err(err @ SearchError::BudgetElapsed { .. }) => {
                tracing::warn!(
                    tiles = self.tiles.len(),
                    budget_ms = self.rules.search_budget_ms,
                    "route search budget elapsed"
                );
                Err(err.into())
            }
        }
    }

    /// Walk direction 0 from `start` until the stepped distance covers
    /// `total`, then pick the chain tile closest to the target.
    ///
    /// Every step is charged against `budget`, so a huge step count gives up
    /// the same way a long search does.
    fn seed_straight_line<B>(
        &mut self,
        start: Hex,
        total: f64,
        budget: &mut B,
    ) -> Result<Hex, RouteError>
    where
        B: SearchBudget + ?Sized,
    {
        let step = self.rules.step_size_m;
        let steps = (total / step).ceil() as usize;
        let mut current = start;
        let mut best = (start, self.distance_to_target(&start));

        for _ in 0..steps {
            if budget.exhausted() {
                tracing::warn!(
                    tiles = self.tiles.len(),
                    steps,
                    "route search budget elapsed while seeding"
                );
                return Err(SearchError::BudgetElapsed { expanded: 0 }.into());
            }
            self.neighbours_at(current.coord, false)
                .ok_or(RouteError::NoDestinationTile)?;
            current = *self
                .tiles
                .get(&current.coord.step(&DIRECTIONS[0]))
                .ok_or(RouteError::NoDestinationTile)?;
            let remaining = self.distance_to_target(&current);
            if remaining < best.1 {
                best = (current, remaining);
            }
        }

        if best.0 == start {
            return Err(RouteError::NoDestinationTile);
        }
        Ok(best.0)
    }

    /// All six tiles around `coord`, generated on first access.
    ///
    /// Returns `None` if `coord` itself has not been materialized. With
    /// `passable` set, tiles the passability policy rejects are dropped.
    pub fn neighbours_at(&mut self, coord: HexCoord, passable: bool) -> Option<Vec<Hex>> {
        let origin = *self.tiles.get(&coord)?;
        let mut neighbours = Vec::with_capacity(DIRECTIONS.len());
        for direction in &DIRECTIONS {
            let neighbour_coord = coord.step(direction);
            let tile = match self.tiles.get(&neighbour_coord) {
                Some(tile) => *tile,
                None => {
                    let tile = self.project(&origin, direction);
                    self.tiles.insert(neighbour_coord, tile);
                    tile
                }
            };
            neighbours.push(tile);
        }

        if passable {
            neighbours.retain(|tile| self.is_passable(&origin, tile));
        }
        Some(neighbours)
    }

    fn project(&self, origin: &Hex, direction: &Direction) -> Hex {
        let heading = normalize_bearing(origin.bearing_deg + direction.bearing_offset_deg);
        let (lat, lon) = destination_point(
            origin.lat,
            origin.lon,
            heading,
            self.rules.step_size_m,
            self.body.radius_m,
        );
        let arrival = final_bearing(origin.lat, origin.lon, lat, lon);
        Hex {
            lat,
            lon,
            altitude_m: terrain_height(lat, lon, &self.body),
            bearing_deg: normalize_bearing(arrival - direction.bearing_offset_deg),
            coord: origin.coord.step(direction),
        }
    }

    fn is_passable(&self, from: &Hex, to: &Hex) -> bool {
        let max_delta = self.rules.max_altitude_delta_m();
        let gentle_slope = (to.altitude_m - from.altitude_m).abs() <= max_delta;
        match self.mode {
            Passability::Land => (to.altitude_m >= 0.0 || !self.body.has_ocean) && gentle_slope,
            Passability::Ocean => to.altitude_m <= 0.0 && self.body.has_ocean,
            Passability::Amphibious => gentle_slope,
            Passability::Any => true,
        }
    }

    fn distance_to_target(&self, tile: &Hex) -> f64 {
        distance(
            tile.lat,
            tile.lon,
            self.target_lat,
            self.target_lon,
            self.body.radius_m,
        )
    }

    pub fn tile(&self, coord: HexCoord) -> Option<&Hex> {
        self.tiles.get(&coord)
    }

    pub fn path(&self) -> Option<&Arc<Path<Hex>>> {
        self.path.as_ref()
    }

    /// Path cost plus the straight remainder from the last tile to the true
    /// target; 0 when no path was found.
    pub fn distance(&self) -> f64 {
        match &self.path {
            Some(path) => path.total_cost() + self.distance_to_target(path.last_step()),
            None => 0.0,
        }
    }

    /// The discovered route in travel order.
    pub fn waypoints(&self) -> Vec<WayPoint> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let mut waypoints: Vec<WayPoint> = path
            .iter()
            .map(|tile| WayPoint::new(tile.lat, tile.lon))
            .collect();
        waypoints.reverse();
        waypoints
    }

    pub fn encoded_path(&self) -> Option<String> {
        self.path.as_deref().map(codec::encode)
    }

    pub fn tiles_generated(&self) -> usize {
        self.tiles.len()
    }

    pub fn nodes_expanded(&self) -> usize {
        self.expansions
    }

    pub fn mode(&self) -> Passability {
        self.mode
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

impl Neighbours<Hex> for PathFinder {
    fn neighbours(&mut self, node: &Hex) -> Vec<Hex> {
        self.expansions += 1;
        node.neighbours(self)
    }
}

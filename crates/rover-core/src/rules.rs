//! Travel rules and thresholds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for pathfinding and background travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelRules {
    /// Lattice edge length in meters; also the unit of path cost
    pub step_size_m: f64,
    /// Wall-clock budget for one A* search in milliseconds
    pub search_budget_ms: u64,
    /// Minimum world-space distance kept from the player's active vehicle
    pub proximity_threshold_m: f64,
    /// Ask the host to drop back to normal time rate on arrival
    pub reduce_time_warp_on_arrival: bool,
}

impl Default for TravelRules {
    fn default() -> Self {
        Self {
            step_size_m: 1000.0,
            search_budget_ms: 10_000,
            proximity_threshold_m: 2000.0,
            reduce_time_warp_on_arrival: true,
        }
    }
}

impl TravelRules {
    pub fn search_budget(&self) -> Duration {
        Duration::from_millis(self.search_budget_ms)
    }

    /// Largest altitude change allowed between adjacent tiles.
    pub fn max_altitude_delta_m(&self) -> f64 {
        self.step_size_m / 2.0
    }
}

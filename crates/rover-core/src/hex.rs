//! Hex lattice tiles.
//!
//! A tile is one sampled surface point. Tiles do not hold a handle to the
//! grid that made them; neighbour lookups go through the owning
//! [`PathFinder`] explicitly.

use crate::pathfinder::PathFinder;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Integer axial coordinates, unique within one grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub x: i32,
    pub y: i32,
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: &Direction) -> Self {
        Self {
            x: self.x + direction.dx,
            y: self.y + direction.dy,
        }
    }

    /// Lattice distance in steps.
    pub fn distance_to(self, other: HexCoord) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx.abs() + dy.abs() + (dx + dy).abs()) / 2
    }
}

/// One of the six lattice directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    /// Heading relative to the tile's own bearing, degrees clockwise
    pub bearing_offset_deg: f64,
    pub dx: i32,
    pub dy: i32,
}

/// Fixed direction table shared by every tile. Index 0 runs straight along
/// the tile's bearing; each next entry turns 60 degrees clockwise, and entry
/// `i + 3` is always the reverse of entry `i`.
pub const DIRECTIONS: [Direction; 6] = [
    Direction { bearing_offset_deg: 0.0, dx: 1, dy: 0 },
    Direction { bearing_offset_deg: 60.0, dx: 0, dy: 1 },
    Direction { bearing_offset_deg: 120.0, dx: -1, dy: 1 },
    Direction { bearing_offset_deg: 180.0, dx: -1, dy: 0 },
    Direction { bearing_offset_deg: 240.0, dx: 0, dy: -1 },
    Direction { bearing_offset_deg: 300.0, dx: 1, dy: -1 },
];

/// An immutable lattice tile.
///
/// Equality and hashing use the axial coordinate only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hex {
    pub lat: f64,
    pub lon: f64,
    /// Terrain height; negative is below sea level
    pub altitude_m: f64,
    /// Heading used to reach this tile, which orients its local frame
    pub bearing_deg: f64,
    pub coord: HexCoord,
}

impl Hex {
    pub fn x(&self) -> i32 {
        self.coord.x
    }

    pub fn y(&self) -> i32 {
        self.coord.y
    }

    /// Passable neighbours of this tile, materialized by `grid` on demand.
    pub fn neighbours(&self, grid: &mut PathFinder) -> Vec<Hex> {
        grid.neighbours_at(self.coord, true).unwrap_or_default()
    }
}

impl PartialEq for Hex {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}

impl Eq for Hex {}

impl Hash for Hex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coord.hash(state);
    }
}

//! Terrain height oracles.
//!
//! The pathfinder treats terrain as a black box: give it a coordinate, get a
//! signed height in meters relative to the body's mean radius (negative is
//! below sea level). Nothing here caches; the hex grid memoizes tiles.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Samples surface height at a coordinate.
pub trait TerrainSampler: Send + Sync {
    fn height(&self, lat: f64, lon: f64) -> f64;
}

impl<F> TerrainSampler for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn height(&self, lat: f64, lon: f64) -> f64 {
        self(lat, lon)
    }
}

/// Same height everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTerrain(pub f64);

impl TerrainSampler for FlatTerrain {
    fn height(&self, _lat: f64, _lon: f64) -> f64 {
        self.0
    }
}

/// Regular lat/lon elevation grid with bilinear interpolation.
///
/// Queries outside the grid are clamped to its edge.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    lat_step_deg: f64,
    lon_step_deg: f64,
    rows: usize,
    cols: usize,
    elevations_m: Vec<f64>,
}

impl TerrainGrid {
    /// Build a grid from row-major elevations (row 0 = `min_lat`).
    ///
    /// Returns `None` when the dimensions are empty or do not match the data.
    pub fn new(
        min_lat: f64,
        min_lon: f64,
        lat_step_deg: f64,
        lon_step_deg: f64,
        rows: usize,
        cols: usize,
        elevations_m: Vec<f64>,
    ) -> Option<Self> {
        if rows == 0 || cols == 0 || rows.checked_mul(cols)? != elevations_m.len() {
            return None;
        }
        if !(lat_step_deg > 0.0 && lon_step_deg > 0.0) {
            return None;
        }
        Some(Self {
            min_lat,
            min_lon,
            max_lat: min_lat + (rows - 1) as f64 * lat_step_deg,
            max_lon: min_lon + (cols - 1) as f64 * lon_step_deg,
            lat_step_deg,
            lon_step_deg,
            rows,
            cols,
            elevations_m,
        })
    }

    pub fn sample(&self, lat: f64, lon: f64) -> f64 {
        if !lat.is_finite() || !lon.is_finite() {
            return 0.0;
        }
        let clamped_lat = lat.clamp(self.min_lat, self.max_lat);
        let clamped_lon = lon.clamp(self.min_lon, self.max_lon);

        let y = ((clamped_lat - self.min_lat) / self.lat_step_deg).clamp(0.0, (self.rows - 1) as f64);
        let x = ((clamped_lon - self.min_lon) / self.lon_step_deg).clamp(0.0, (self.cols - 1) as f64);

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(self.rows - 1);
        let x1 = (x0 + 1).min(self.cols - 1);
        let dy = y - y0 as f64;
        let dx = x - x0 as f64;

        let v00 = self.value_at(y0, x0);
        let v10 = self.value_at(y0, x1);
        let v01 = self.value_at(y1, x0);
        let v11 = self.value_at(y1, x1);

        let v0 = v00 + (v10 - v00) * dx;
        let v1 = v01 + (v11 - v01) * dx;
        v0 + (v1 - v0) * dy
    }

    fn value_at(&self, row: usize, col: usize) -> f64 {
        let idx = row.saturating_mul(self.cols) + col.min(self.cols - 1);
        self.elevations_m.get(idx).copied().unwrap_or(0.0)
    }
}

impl TerrainSampler for TerrainGrid {
    fn height(&self, lat: f64, lon: f64) -> f64 {
        self.sample(lat, lon)
    }
}

#[derive(Debug, Clone, Copy)]
struct Ridge {
    amplitude_m: f64,
    lat_freq: f64,
    lon_freq: f64,
    phase: f64,
}

/// Deterministic rolling terrain: a seeded sum of sinusoidal ridges.
///
/// `sea_level_bias_m` shifts the whole surface; a negative bias floods the
/// lowlands.
#[derive(Debug, Clone)]
pub struct ProceduralTerrain {
    ridges: Vec<Ridge>,
    sea_level_bias_m: f64,
}

impl ProceduralTerrain {
    const RIDGE_COUNT: usize = 6;

    pub fn new(seed: u64, max_relief_m: f64, sea_level_bias_m: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let per_ridge = max_relief_m.abs() / Self::RIDGE_COUNT as f64;
        let ridges = (0..Self::RIDGE_COUNT)
            .map(|_| Ridge {
                amplitude_m: rng.random_range(0.25..1.0) * per_ridge,
                lat_freq: rng.random_range(1.0..12.0),
                lon_freq: rng.random_range(1.0..12.0),
                phase: rng.random_range(0.0..std::f64::consts::TAU),
            })
            .collect();
        Self {
            ridges,
            sea_level_bias_m,
        }
    }
}

impl TerrainSampler for ProceduralTerrain {
    fn height(&self, lat: f64, lon: f64) -> f64 {
        let phi = lat.to_radians();
        let lambda = lon.to_radians();
        self.ridges.iter().fold(self.sea_level_bias_m, |acc, ridge| {
            acc + ridge.amplitude_m
                * (ridge.lat_freq * phi + ridge.lon_freq * lambda + ridge.phase).sin()
        })
    }
}

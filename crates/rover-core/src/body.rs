//! Celestial bodies vehicles travel across.

use crate::terrain::{FlatTerrain, ProceduralTerrain, TerrainSampler};
use std::fmt;
use std::sync::Arc;

/// A body descriptor: radius, ocean flag and the terrain oracle.
#[derive(Clone)]
pub struct Body {
    pub name: String,
    pub radius_m: f64,
    pub has_ocean: bool,
    /// `false` for stars and gas giants; their terrain always samples as 0.
    pub has_surface: bool,
    pub terrain: Arc<dyn TerrainSampler>,
}

impl Body {
    pub fn new(
        name: impl Into<String>,
        radius_m: f64,
        has_ocean: bool,
        terrain: impl TerrainSampler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            radius_m,
            has_ocean,
            has_surface: true,
            terrain: Arc::new(terrain),
        }
    }

    /// A body without a solid surface.
    pub fn gaseous(name: impl Into<String>, radius_m: f64) -> Self {
        Self {
            has_surface: false,
            ..Self::new(name, radius_m, false, FlatTerrain(0.0))
        }
    }

    pub fn circumference_m(&self) -> f64 {
        std::f64::consts::TAU * self.radius_m
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("name", &self.name)
            .field("radius_m", &self.radius_m)
            .field("has_ocean", &self.has_ocean)
            .field("has_surface", &self.has_surface)
            .finish_non_exhaustive()
    }
}

/// Named bodies known to the server and CLI.
#[derive(Debug, Clone, Default)]
pub struct BodyCatalog {
    bodies: Vec<Body>,
}

impl BodyCatalog {
    /// The standard system: an ocean world, an airless moon and a gas giant.
    pub fn standard(terrain_seed: u64) -> Self {
        Self {
            bodies: vec![
                Body::new(
                    "Terra",
                    600_000.0,
                    true,
                    ProceduralTerrain::new(terrain_seed, 1_200.0, 150.0),
                ),
                Body::new(
                    "Selene",
                    200_000.0,
                    false,
                    ProceduralTerrain::new(terrain_seed.wrapping_add(1), 2_500.0, 0.0),
                ),
                Body::gaseous("Jool", 6_000_000.0),
            ],
        }
    }

    pub fn insert(&mut self, body: Body) {
        self.bodies.retain(|existing| existing.name != body.name);
        self.bodies.push(body);
    }

    pub fn get(&self, name: &str) -> Option<&Body> {
        self.bodies
            .iter()
            .find(|body| body.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }
}

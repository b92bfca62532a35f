//! Core data models shared by the pathfinder, codec and travel controller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A decoded route point. Plain value, no identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WayPoint {
    pub lat: f64,
    pub lon: f64,
}

impl WayPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Which tiles a vehicle may traverse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Passability {
    /// Dry land with a bounded slope
    #[default]
    Land,
    /// Open water only
    Ocean,
    /// Land or water, bounded slope
    Amphibious,
    /// No filtering at all
    Any,
}

impl fmt::Display for Passability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Passability::Land => "land",
            Passability::Ocean => "ocean",
            Passability::Amphibious => "amphibious",
            Passability::Any => "any",
        };
        f.write_str(name)
    }
}

impl FromStr for Passability {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "land" => Ok(Passability::Land),
            "ocean" | "water" => Ok(Passability::Ocean),
            "amphibious" | "both" => Ok(Passability::Amphibious),
            "any" => Ok(Passability::Any),
            other => Err(format!("unknown passability mode: {other}")),
        }
    }
}

/// Where a vehicle is relative to the body's surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleSituation {
    #[default]
    Landed,
    Splashed,
    Flying,
    Orbiting,
}

impl VehicleSituation {
    /// Whether a vehicle in this situation may start travelling in `mode`.
    pub fn permits(self, mode: Passability) -> bool {
        match mode {
            Passability::Land => self == VehicleSituation::Landed,
            Passability::Ocean => self == VehicleSituation::Splashed,
            Passability::Amphibious | Passability::Any => {
                matches!(self, VehicleSituation::Landed | VehicleSituation::Splashed)
            }
        }
    }
}

/// Snapshot of a vehicle's drive and power systems at activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSystems {
    pub average_speed_mps: f64,
    #[serde(default)]
    pub power_required_w: f64,
    #[serde(default)]
    pub power_available_w: f64,
}

/// The vehicle currently under live player control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveVehicle {
    pub vehicle_id: String,
    pub body_name: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passability_parses_aliases() {
        assert_eq!("Land".parse::<Passability>(), Ok(Passability::Land));
        assert_eq!("water".parse::<Passability>(), Ok(Passability::Ocean));
        assert_eq!("both".parse::<Passability>(), Ok(Passability::Amphibious));
        assert!("lava".parse::<Passability>().is_err());
    }

    #[test]
    fn situation_gates_modes() {
        assert!(VehicleSituation::Landed.permits(Passability::Land));
        assert!(!VehicleSituation::Splashed.permits(Passability::Land));
        assert!(VehicleSituation::Splashed.permits(Passability::Ocean));
        assert!(VehicleSituation::Splashed.permits(Passability::Amphibious));
        assert!(!VehicleSituation::Flying.permits(Passability::Amphibious));
        assert!(!VehicleSituation::Orbiting.permits(Passability::Any));
    }

    #[test]
    fn passability_serializes_lowercase() {
        let json = serde_json::to_string(&Passability::Amphibious).unwrap();
        assert_eq!(json, "\"amphibious\"");
    }
}

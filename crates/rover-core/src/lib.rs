//! Surface travel core: geodesy, hex-lattice route planning, route codec and
//! background travel replay.

pub mod astar;
pub mod body;
pub mod codec;
pub mod controller;
pub mod error;
pub mod geodesy;
pub mod hex;
pub mod models;
pub mod pathfinder;
pub mod rules;
pub mod terrain;

pub use astar::{Deadline, ExpansionLimit, Path, PriorityQueue, SearchBudget, Unbounded};
pub use body::{Body, BodyCatalog};
pub use controller::{
    ActivationRequest, ArrivalEvent, Notifier, NullNotifier, RecordingNotifier, TickContext,
    TickOutcome, TravelController, TravelState, TravelStatus, VehiclePlacement,
};
pub use error::{ActivationError, CodecError, RouteError, SearchError};
pub use hex::{Hex, HexCoord};
pub use models::{ActiveVehicle, Passability, VehicleSituation, VehicleSystems, WayPoint};
pub use pathfinder::PathFinder;
pub use rules::TravelRules;
pub use terrain::{FlatTerrain, ProceduralTerrain, TerrainGrid, TerrainSampler};

//! Shared server state.

pub mod store;

pub use store::{
    AppState, AutopilotRequest, NewVehicle, StoreError, TrackedVehicle, VehiclePosition,
    VehicleView,
};

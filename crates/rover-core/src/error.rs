//! Error taxonomy for route planning, codec and travel activation.
//!
//! Every variant is recoverable: callers surface it to the user or retry on
//! a later tick; none should halt replay for other vehicles.

use crate::models::Passability;
use thiserror::Error;

/// Why the generic A* search stopped without reaching its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search frontier exhausted before reaching the destination")]
    Exhausted,

    #[error("search budget elapsed after {expanded} expansions")]
    BudgetElapsed { expanded: usize },
}

/// No-route-found outcomes of the hex pathfinder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("step size must be a positive finite length, got {0} m")]
    InvalidStepSize(f64),

    #[error("target is {distance_m:.0} m away, closer than one {step_size_m:.0} m step")]
    TargetTooClose { distance_m: f64, step_size_m: f64 },

    #[error("no destination tile could be placed near the target")]
    NoDestinationTile,

    #[error("no {mode} route to the target")]
    NoRoute { mode: Passability },

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Decode failures of a persisted route string.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("route is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("route is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("malformed route tuple: {0:?}")]
    MalformedTuple(String),

    #[error("invalid coordinate {value:?}: {source}")]
    InvalidNumber {
        value: String,
        source: std::num::ParseFloatError,
    },
}

/// Why autopilot refused to engage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActivationError {
    #[error("autopilot is already active")]
    AlreadyActive,

    #[error("average speed must be positive, got {0} m/s")]
    NotMoving(f64),

    #[error("insufficient power: need {required_w:.1} W, have {available_w:.1} W")]
    NoPower { required_w: f64, available_w: f64 },

    #[error("vehicle must be {expected} to travel in {mode} mode")]
    BadSituation {
        mode: Passability,
        expected: &'static str,
    },

    #[error(transparent)]
    Route(#[from] RouteError),
}

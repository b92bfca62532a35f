//! Compact, transport-safe route encoding.
//!
//! A route is written as `lat:lon;` tuples from destination back to start,
//! base64 encoded, with `/` replaced by `#` because the persistence format
//! reads `//` as a comment. Decoding undoes all of that and returns the
//! waypoints in travel order (start first).

use crate::astar::Path;
use crate::error::CodecError;
use crate::hex::Hex;
use crate::models::WayPoint;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt::Write as _;

/// Encode a discovered path.
pub fn encode(path: &Path<Hex>) -> String {
    encode_waypoints(path.iter().map(|tile| WayPoint::new(tile.lat, tile.lon)))
}

/// Encode waypoints given in destination-to-start order.
///
/// Coordinates use the shortest decimal form that parses back to the same
/// `f64`.
pub fn encode_waypoints<I>(destination_to_start: I) -> String
where
    I: IntoIterator<Item = WayPoint>,
{
    let mut text = String::new();
    for waypoint in destination_to_start {
        let _ = write!(text, "{}:{};", waypoint.lat, waypoint.lon);
    }
    to_transport_safe(STANDARD.encode(text.as_bytes()))
}

/// Decode a persisted route into start-to-destination order.
///
/// `None`, empty and whitespace-only input decode to an empty route.
pub fn decode(encoded: Option<&str>) -> Result<Vec<WayPoint>, CodecError> {
    let Some(encoded) = encoded.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(Vec::new());
    };

    let bytes = STANDARD.decode(from_transport_safe(encoded))?;
    let text = String::from_utf8(bytes)?;

    let mut waypoints = Vec::new();
    for tuple in text.split(';').filter(|tuple| !tuple.is_empty()) {
        let (lat, lon) = tuple
            .split_once(':')
            .ok_or_else(|| CodecError::MalformedTuple(tuple.to_string()))?;
        waypoints.push(WayPoint::new(parse_coordinate(lat)?, parse_coordinate(lon)?));
    }
    waypoints.reverse();
    Ok(waypoints)
}

fn parse_coordinate(value: &str) -> Result<f64, CodecError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|source| CodecError::InvalidNumber {
            value: value.to_string(),
            source,
        })
}

fn to_transport_safe(base64: String) -> String {
    base64.replace('/', "#")
}

fn from_transport_safe(encoded: &str) -> String {
    encoded.replace('#', "/")
}

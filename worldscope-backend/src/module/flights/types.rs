//! OpenSky wire types

use serde::Deserialize;
use serde_json::Value;

/// Body of `GET /api/states/all`
///
/// Each state vector is a heterogeneous JSON array, so it is kept as raw
/// values and picked apart by index in the parser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenSkyStates {
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub states: Option<Vec<Vec<Value>>>,
}

/// Positions inside a state vector
pub(crate) mod index {
    pub const ICAO24: usize = 0;
    pub const CALLSIGN: usize = 1;
    pub const ORIGIN_COUNTRY: usize = 2;
    pub const LONGITUDE: usize = 5;
    pub const LATITUDE: usize = 6;
    pub const BARO_ALTITUDE: usize = 7;
    pub const ON_GROUND: usize = 8;
    pub const VELOCITY: usize = 9;
    pub const TRUE_TRACK: usize = 10;
    pub const GEO_ALTITUDE: usize = 13;
}

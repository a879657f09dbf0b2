//! OpenSky state vector normalization

use serde_json::Value;
use worldscope_common::{FlightRecord, Positioned};

use super::types::{OpenSkyStates, index};
use crate::error::Result;

fn number_at(state: &[Value], i: usize) -> Option<f64> {
    state.get(i).and_then(Value::as_f64)
}

fn string_at(state: &[Value], i: usize) -> Option<&str> {
    state.get(i).and_then(Value::as_str)
}

/// Normalize one state vector.
///
/// Returns `None` if the callsign is blank or the position is missing or
/// non-finite.
pub fn parse_state_vector(state: &[Value]) -> Option<FlightRecord> {
    let callsign = string_at(state, index::CALLSIGN)?.trim();
    if callsign.is_empty() {
        return None;
    }

    let latitude = number_at(state, index::LATITUDE)?;
    let longitude = number_at(state, index::LONGITUDE)?;

    let altitude = number_at(state, index::GEO_ALTITUDE)
        .or_else(|| number_at(state, index::BARO_ALTITUDE))
        .unwrap_or(0.0);

    let id = string_at(state, index::ICAO24)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(callsign)
        .to_string();

    let record = FlightRecord {
        id,
        callsign: callsign.to_string(),
        origin_country: string_at(state, index::ORIGIN_COUNTRY).map(str::to_string),
        latitude,
        longitude,
        altitude,
        velocity: number_at(state, index::VELOCITY),
        heading: number_at(state, index::TRUE_TRACK),
        on_ground: state
            .get(index::ON_GROUND)
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };

    record.has_valid_position().then_some(record)
}

/// Keep valid states, highest first, at most `max_flights`
pub fn normalize_flights(states: &[Vec<Value>], max_flights: usize) -> Vec<FlightRecord> {
    let mut flights: Vec<FlightRecord> = states
        .iter()
        .filter_map(|state| parse_state_vector(state))
        .collect();

    flights.sort_by(|a, b| b.altitude.total_cmp(&a.altitude));
    flights.truncate(max_flights);
    flights
}

/// Parse a raw `states/all` body. A null or missing `states` array yields no flights.
pub fn parse_opensky_states(body: &str, max_flights: usize) -> Result<Vec<FlightRecord>> {
    let response: OpenSkyStates = serde_json::from_str(body)?;
    let states = response.states.unwrap_or_default();
    Ok(normalize_flights(&states, max_flights))
}

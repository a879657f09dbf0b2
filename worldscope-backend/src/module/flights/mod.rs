//! Live aircraft feed
//!
//! Polls the OpenSky `states/all` endpoint, turns the positional state vectors
//! into [`FlightRecord`](worldscope_common::FlightRecord)s and publishes them on
//! `flights:update`.

pub mod types;
pub mod parser;
pub mod updater;

pub use parser::{normalize_flights, parse_opensky_states, parse_state_vector};
pub use types::OpenSkyStates;
pub use updater::{FlightFeed, MAX_FLIGHTS, OPENSKY_STATES_URL, POLL_INTERVAL, REQUEST_TIMEOUT};

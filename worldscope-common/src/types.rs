use serde::{Deserialize, Serialize};

/// Broadcast channel a subscriber listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "flights:update")]
    Flights,
    #[serde(rename = "satellites:update")]
    Satellites,
    #[serde(rename = "earthquakes:update")]
    Earthquakes,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Flights, Channel::Satellites, Channel::Earthquakes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Flights => "flights:update",
            Channel::Satellites => "satellites:update",
            Channel::Earthquakes => "earthquakes:update",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flights:update" => Ok(Channel::Flights),
            "satellites:update" => Ok(Channel::Satellites),
            "earthquakes:update" => Ok(Channel::Earthquakes),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}

/// Anything that can be placed on the globe.
///
/// Records are only broadcast if `has_valid_position()` holds; everything else
/// is dropped by the feed that produced it.
pub trait Positioned {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;

    fn has_valid_position(&self) -> bool {
        self.latitude().is_finite() && self.longitude().is_finite()
    }
}

/// Aircraft state (altitude in meters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// ICAO 24-bit transponder address, or the callsign if the address is missing
    pub id: String,
    pub callsign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Geometric altitude if reported, else barometric, else 0
    pub altitude: f64,
    /// Ground speed in m/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    /// True track in degrees clockwise from north
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default)]
    pub on_ground: bool,
}

impl Positioned for FlightRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Propagated satellite position (altitude in kilometers above the ellipsoid)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteRecord {
    /// NORAD catalog number, or a sequence index if the element set has none
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Positioned for SatelliteRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }

    fn has_valid_position(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && self.altitude.is_finite()
    }
}

/// Seismic event (depth in kilometers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeRecord {
    pub id: String,
    pub magnitude: Option<f64>,
    pub place: Option<String>,
    /// Origin time in milliseconds since the Unix epoch
    pub time: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: Option<f64>,
}

impl Positioned for EarthquakeRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Frame sent to every subscriber: `{"event": "<channel>", "data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub event: Channel,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(event: Channel, data: T) -> Self {
        Self { event, data }
    }
}

/// Payload of the liveness endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

impl HealthStatus {
    pub fn ok(service: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
        }
    }
}

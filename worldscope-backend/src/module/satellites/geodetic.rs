//! Earth rotation and ECI to geodetic conversion (WGS84)

use chrono::{DateTime, Utc};
use std::f64::consts::PI;

/// Equatorial radius in km
pub const EQUATORIAL_EARTH_RADIUS_KM: f64 = 6378.137;
/// Polar radius in km
pub const POLAR_EARTH_RADIUS_KM: f64 = 6356.7523142;

const F_EARTH: f64 = (EQUATORIAL_EARTH_RADIUS_KM - POLAR_EARTH_RADIUS_KM) / EQUATORIAL_EARTH_RADIUS_KM;
const E2_EARTH: f64 = 2.0 * F_EARTH - F_EARTH * F_EARTH;

/// 2000-01-01T12:00:00Z in milliseconds since the Unix epoch
const J2000_UNIX_MILLIS: i64 = 946_728_000_000;
const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
const GMST_BASE_DEG: f64 = 280.46061837;
const GMST_ROTATION_PER_DAY: f64 = 360.98564736629;
const GMST_CORRECTION: f64 = 0.000387933;

const LATITUDE_ITERATIONS: usize = 20;

/// Geodetic position, angles in radians, height in km above the ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl Geodetic {
    pub fn latitude_deg(&self) -> f64 {
        self.latitude.to_degrees()
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude.to_degrees()
    }
}

/// Greenwich mean sidereal time in radians, normalized to [0, 2π)
pub fn greenwich_mean_sidereal_time(at: DateTime<Utc>) -> f64 {
    let days_since_j2000 = (at.timestamp_millis() - J2000_UNIX_MILLIS) as f64 / MILLIS_PER_DAY;
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38710000.0;
    gmst_degrees.rem_euclid(360.0).to_radians()
}

/// Convert an Earth-centered inertial position (km) to geodetic coordinates.
///
/// Longitude is normalized to [-π, π]. Latitude is found by fixed-point
/// iteration, which converges everywhere except exactly on the polar axis.
pub fn eci_to_geodetic(position: [f64; 3], gmst: f64) -> Geodetic {
    let [x, y, z] = position;
    let a = EQUATORIAL_EARTH_RADIUS_KM;
    let r = (x * x + y * y).sqrt();

    let mut longitude = y.atan2(x) - gmst;
    while longitude < -PI {
        longitude += 2.0 * PI;
    }
    while longitude > PI {
        longitude -= 2.0 * PI;
    }

    let mut latitude = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..LATITUDE_ITERATIONS {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - E2_EARTH * sin_lat * sin_lat).sqrt();
        latitude = (z + a * c * E2_EARTH * sin_lat).atan2(r);
    }

    let height = r / latitude.cos() - a * c;

    Geodetic { latitude, longitude, height }
}

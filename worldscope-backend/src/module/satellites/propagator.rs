//! SGP4 propagation of the catalog to geodetic positions

use chrono::{DateTime, Utc};
use worldscope_common::{Positioned, SatelliteRecord};

use super::catalog::TrackedObject;
use super::geodetic::{eci_to_geodetic, greenwich_mean_sidereal_time};

/// Minutes between the element-set epoch and `at` (negative before the epoch)
pub fn minutes_since_epoch(object: &TrackedObject, at: DateTime<Utc>) -> f64 {
    let epoch = object.elements.datetime.and_utc();
    (at - epoch).num_milliseconds() as f64 / 60_000.0
}

/// Position of one object at `at`, `None` if propagation fails
pub fn propagate_object(object: &TrackedObject, at: DateTime<Utc>, gmst: f64) -> Option<SatelliteRecord> {
    let prediction = match object
        .constants
        .propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch(object, at)))
    {
        Ok(prediction) => prediction,
        Err(e) => {
            tracing::trace!("Propagation of {} failed: {:?}", object.id, e);
            return None;
        }
    };

    let geodetic = eci_to_geodetic(prediction.position, gmst);
    let record = SatelliteRecord {
        id: object.id.clone(),
        name: object.name.clone(),
        latitude: geodetic.latitude_deg(),
        longitude: geodetic.longitude_deg(),
        altitude: geodetic.height,
    };

    record.has_valid_position().then_some(record)
}

/// Positions of every object that propagates cleanly, in catalog order
pub fn compute_positions(objects: &[TrackedObject], at: DateTime<Utc>) -> Vec<SatelliteRecord> {
    let gmst = greenwich_mean_sidereal_time(at);
    objects
        .iter()
        .filter_map(|object| propagate_object(object, at, gmst))
        .collect()
}

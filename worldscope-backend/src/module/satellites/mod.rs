//! Satellite tracking
//!
//! Two loops share one [`Catalog`]: the hourly element-set refresh and the
//! one-second position feed that propagates every tracked object and
//! publishes the result on `satellites:update`.

pub mod catalog;
pub mod geodetic;
pub mod propagator;
pub mod updater;

pub use catalog::{
    CELESTRAK_ACTIVE_URL, Catalog, CatalogUpdater, MAX_SATELLITES, TLE_REFRESH_INTERVAL, TrackedObject,
    derive_object_id, parse_element_sets,
};
pub use geodetic::{Geodetic, eci_to_geodetic, greenwich_mean_sidereal_time};
pub use propagator::compute_positions;
pub use updater::{POSITION_INTERVAL, SatellitePositionFeed, start_satellite_service};

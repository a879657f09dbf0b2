//! USGS earthquake feed (past day, all magnitudes)

pub mod types;
pub mod parser;
pub mod updater;

pub use parser::{normalize_feature, parse_usgs_geojson};
pub use types::{Feature, FeatureCollection, Geometry, Properties};
pub use updater::{EarthquakeFeed, POLL_INTERVAL, REQUEST_TIMEOUT, USGS_ALL_DAY_URL};

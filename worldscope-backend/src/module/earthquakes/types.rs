//! GeoJSON summary feed types
//!
//! Only the members that end up in an
//! [`EarthquakeRecord`](worldscope_common::EarthquakeRecord) are modeled;
//! everything else in the feed is ignored.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Option<Vec<Feature>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    /// USGS event id, normally a string such as "ci12345"
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    /// `[longitude, latitude, depth]`
    #[serde(default)]
    pub coordinates: Option<Vec<Option<f64>>>,
}

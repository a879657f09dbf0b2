//! GeoJSON feature normalization

use serde_json::Value;
use worldscope_common::{EarthquakeRecord, Positioned};

use super::types::{Feature, FeatureCollection};
use crate::error::Result;

fn feature_id(id: Option<&Value>) -> Option<String> {
    match id? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize one feature, `None` if it has no id or no finite position
pub fn normalize_feature(feature: &Feature) -> Option<EarthquakeRecord> {
    let id = feature_id(feature.id.as_ref())?;

    let coordinates = feature
        .geometry
        .as_ref()
        .and_then(|g| g.coordinates.as_deref())
        .unwrap_or_default();
    let coordinate = |i: usize| coordinates.get(i).copied().flatten();

    let properties = feature.properties.as_ref();

    let record = EarthquakeRecord {
        id,
        magnitude: properties.and_then(|p| p.mag),
        place: properties.and_then(|p| p.place.clone()),
        time: properties.and_then(|p| p.time),
        longitude: coordinate(0)?,
        latitude: coordinate(1)?,
        depth: coordinate(2),
    };

    record.has_valid_position().then_some(record)
}

/// Parse a summary feed body, keeping feed order
pub fn parse_usgs_geojson(body: &str) -> Result<Vec<EarthquakeRecord>> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    Ok(collection
        .features
        .unwrap_or_default()
        .iter()
        .filter_map(normalize_feature)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::earthquakes::types::{Geometry, Properties};
    use serde_json::json;

    fn feature(id: Option<Value>, coordinates: Vec<Option<f64>>) -> Feature {
        Feature {
            id,
            properties: Some(Properties {
                mag: Some(2.4),
                place: Some("5km N of Somewhere, CA".to_string()),
                time: Some(1_700_000_000_000),
            }),
            geometry: Some(Geometry { coordinates: Some(coordinates) }),
        }
    }

    #[test]
    fn test_valid_feature() {
        let f = feature(Some(json!("ci12345")), vec![Some(-118.2), Some(34.1), Some(10.0)]);
        let quake = normalize_feature(&f).unwrap();

        assert_eq!(quake.id, "ci12345");
        assert_eq!(quake.longitude, -118.2);
        assert_eq!(quake.latitude, 34.1);
        assert_eq!(quake.depth, Some(10.0));
        assert_eq!(quake.magnitude, Some(2.4));
        assert_eq!(quake.time, Some(1_700_000_000_000));
    }

    #[test]
    fn test_non_finite_coordinates_are_dropped() {
        let nan = feature(Some(json!("us1")), vec![Some(f64::NAN), Some(34.1), Some(10.0)]);
        let inf = feature(Some(json!("us2")), vec![Some(-118.2), Some(f64::INFINITY), None]);
        assert!(normalize_feature(&nan).is_none());
        assert!(normalize_feature(&inf).is_none());
    }

    #[test]
    fn test_missing_id_or_coordinates_are_dropped() {
        assert!(normalize_feature(&feature(None, vec![Some(1.0), Some(2.0)])).is_none());
        assert!(normalize_feature(&feature(Some(json!("")), vec![Some(1.0), Some(2.0)])).is_none());
        assert!(normalize_feature(&feature(Some(json!("nc1")), vec![Some(1.0)])).is_none());
        assert!(normalize_feature(&feature(Some(json!("nc2")), vec![Some(1.0), None])).is_none());
        assert!(normalize_feature(&Feature::default()).is_none());
    }

    #[test]
    fn test_depth_is_optional() {
        let quake = normalize_feature(&feature(Some(json!("ak1")), vec![Some(-150.0), Some(61.2)])).unwrap();
        assert_eq!(quake.depth, None);
    }

    #[test]
    fn test_parse_feed_body() {
        let body = json!({
            "type": "FeatureCollection",
            "metadata": {"count": 3},
            "features": [
                {
                    "type": "Feature",
                    "id": "ci12345",
                    "properties": {"mag": 1.1, "place": "10km S of Idyllwild, CA", "time": 1700000000000i64, "tsunami": 0},
                    "geometry": {"type": "Point", "coordinates": [-116.7, 33.6, 12.3]}
                },
                {
                    "type": "Feature",
                    "id": "nc777",
                    "properties": {"mag": null, "place": null, "time": null},
                    "geometry": {"type": "Point", "coordinates": [null, 38.8, 2.0]}
                },
                {
                    "type": "Feature",
                    "id": "hv42",
                    "properties": {"mag": 2.0, "place": "Hawaii", "time": 1700000100000i64},
                    "geometry": null
                }
            ]
        })
        .to_string();

        let quakes = parse_usgs_geojson(&body).unwrap();
        assert_eq!(quakes.len(), 1);
        assert_eq!(quakes[0].id, "ci12345");
        assert_eq!(quakes[0].place.as_deref(), Some("10km S of Idyllwild, CA"));

        assert!(parse_usgs_geojson(r#"{"type":"FeatureCollection"}"#).unwrap().is_empty());
        assert!(parse_usgs_geojson("not json").is_err());
    }
}

use serde::{Deserialize, Serialize};

/// Closed set of geometries this service understands. Every consumer matches
/// exhaustively; point-located entities reject anything but `Point` during
/// validation instead of silently ignoring it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
}

impl Geometry {
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lon, lat],
        }
    }

    /// Returns the coordinates when this is a point geometry.
    pub fn as_point(&self) -> Option<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            Geometry::LineString { .. } => None,
        }
    }
}

/// Resolved location of a point-located entity: the stored geometry plus the
/// names derived from the road network and municipality lookups, when any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub way_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: LocationProperties,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_round_trips_as_geojson() {
        let geometry = Geometry::point(-8.6291, 41.1579);
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], -8.6291);

        let back: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, geometry);
    }

    #[test]
    fn line_string_is_not_a_point() {
        let geometry = Geometry::LineString {
            coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        assert!(geometry.as_point().is_none());
    }
}

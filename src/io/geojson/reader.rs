use geojson::{GeoJson, Geometry, Value};

use crate::error::{GeoLiteralError, Result};

/// The placeholder geometry, `{"type": "Point", "coordinates": []}`, used for cells that could
/// not be converted.
pub fn empty_point() -> Geometry {
    Geometry::new(Value::Point(vec![]))
}

pub fn is_empty_point(geometry: &Geometry) -> bool {
    matches!(&geometry.value, Value::Point(position) if position.is_empty())
}

/// Parse the text of a GeoJSON literal.
///
/// A Geometry object is returned as is. A Feature yields its geometry, or the empty point when
/// it has none.
pub fn parse_geojson(text: &str) -> Result<Geometry> {
    match text.parse::<GeoJson>()? {
        GeoJson::Geometry(geometry) => Ok(geometry),
        GeoJson::Feature(feature) => Ok(feature.geometry.unwrap_or_else(empty_point)),
        GeoJson::FeatureCollection(_) => Err(GeoLiteralError::UnexpectedGeoJson(
            "FeatureCollection".to_string(),
        )),
    }
}

use std::str::FromStr;

use geojson::{Geometry, Value};
use wkt::Wkt;

use crate::error::{GeoLiteralError, Result};

/// Parse a bare WKT body (no CRS prefix) into a GeoJSON geometry.
///
/// Coordinates are kept in the order they are written. Only the first two dimensions are kept.
pub fn parse_wkt(body: &str) -> Result<Geometry> {
    let wkt = Wkt::<f64>::from_str(body).map_err(|err| GeoLiteralError::Wkt(err.to_string()))?;
    let geometry = geo_types::Geometry::<f64>::try_from(wkt)
        .map_err(|err| GeoLiteralError::Wkt(err.to_string()))?;
    Ok(Geometry::new(Value::from(&geometry)))
}

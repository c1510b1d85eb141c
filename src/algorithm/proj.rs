use geojson::{Geometry, PointType, Value};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::{debug, warn};

use crate::crs::Srid;
use crate::error::{GeoLiteralError, Result};
use crate::registry::ProjectionRegistry;

/// Reproject a geometry tree, returning a new tree and leaving `self` untouched.
pub trait Reproject {
    fn reproject(&self, transform: &CoordTransform) -> Self
    where
        Self: Sized;
}

impl Reproject for Value {
    fn reproject(&self, transform: &CoordTransform) -> Self {
        match self {
            Value::Point(position) => Value::Point(transform.apply(position)),
            Value::MultiPoint(positions) => Value::MultiPoint(transform.apply_all(positions)),
            Value::LineString(positions) => Value::LineString(transform.apply_all(positions)),
            Value::MultiLineString(lines) => Value::MultiLineString(
                lines.iter().map(|line| transform.apply_all(line)).collect(),
            ),
            Value::Polygon(rings) => {
                Value::Polygon(rings.iter().map(|ring| transform.apply_all(ring)).collect())
            }
            Value::MultiPolygon(polygons) => Value::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| rings.iter().map(|ring| transform.apply_all(ring)).collect())
                    .collect(),
            ),
            Value::GeometryCollection(geometries) => Value::GeometryCollection(
                geometries
                    .iter()
                    .map(|geometry| geometry.reproject(transform))
                    .collect(),
            ),
        }
    }
}

impl Reproject for Geometry {
    /// The bounding box, if any, is dropped since it is expressed in the source CRS.
    fn reproject(&self, transform: &CoordTransform) -> Self {
        Geometry {
            bbox: None,
            value: self.value.reproject(transform),
            foreign_members: self.foreign_members.clone(),
        }
    }
}

/// Reproject `geometry` from `source` to `target` using the definitions in `registry`.
///
/// A source of EPSG:4326 is taken to be written latitude first, so its coordinates are swapped
/// into longitude first order. Every other source is projected with its registered definition;
/// a position that fails to project is kept as it was.
pub fn reproject(
    geometry: &Geometry,
    source: Srid,
    target: Srid,
    registry: &ProjectionRegistry,
) -> Geometry {
    geometry.reproject(&CoordTransform::new(source, target, registry))
}

/// Reproject a longitude/latitude `geometry` (CRS84 axis order) to `target`.
///
/// Nothing is swapped. With a WGS84 target the geometry is returned as is.
pub fn reproject_lon_lat(
    geometry: &Geometry,
    target: Srid,
    registry: &ProjectionRegistry,
) -> Geometry {
    if target == Srid::WGS84 {
        return geometry.clone();
    }
    geometry.reproject(&CoordTransform::from_lon_lat(target, registry))
}

/// The per-position operation applied by [`Reproject`].
pub struct CoordTransform {
    swap_axes: bool,
    projection: Option<Projection>,
}

impl CoordTransform {
    /// Transform from `source` to `target`, reading an EPSG:4326 source latitude first.
    pub fn new(source: Srid, target: Srid, registry: &ProjectionRegistry) -> Self {
        Self::build(source, source == Srid::WGS84, target, registry)
    }

    /// Transform from longitude/latitude WGS84 to `target`.
    pub fn from_lon_lat(target: Srid, registry: &ProjectionRegistry) -> Self {
        Self::build(Srid::WGS84, false, target, registry)
    }

    fn build(source: Srid, swap_axes: bool, target: Srid, registry: &ProjectionRegistry) -> Self {
        let projection = if source == target {
            None
        } else {
            match Projection::new(source, target, registry) {
                Ok(projection) => Some(projection),
                Err(err) => {
                    warn!("Leaving coordinates in {source} unprojected: {err}");
                    None
                }
            }
        };
        Self {
            swap_axes,
            projection,
        }
    }

    /// Transform one position. Ordinates past the first two are carried over unchanged.
    pub fn apply(&self, position: &[f64]) -> PointType {
        let mut out = position.to_vec();
        if out.len() < 2 {
            return out;
        }
        if self.swap_axes {
            out.swap(0, 1);
        }
        if let Some(projection) = &self.projection {
            match projection.project(out[0], out[1]) {
                Ok((x, y)) => {
                    out[0] = x;
                    out[1] = y;
                }
                Err(err) => debug!("Keeping ({}, {}) unprojected: {err}", out[0], out[1]),
            }
        }
        out
    }

    fn apply_all(&self, positions: &[PointType]) -> Vec<PointType> {
        positions
            .iter()
            .map(|position| self.apply(position))
            .collect()
    }
}

struct Projection {
    source: Proj,
    target: Proj,
}

impl Projection {
    fn new(source: Srid, target: Srid, registry: &ProjectionRegistry) -> Result<Self> {
        Ok(Self {
            source: parse_definition(source, &definition(source, registry)?)?,
            target: parse_definition(target, &definition(target, registry)?)?,
        })
    }

    fn project(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        // proj4rs works in radians for geographic systems
        let mut point = if self.source.is_latlong() {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&self.source, &self.target, &mut point)
            .map_err(|err| GeoLiteralError::Projection(format!("{err:?}")))?;

        let (x, y) = if self.target.is_latlong() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        if x.is_finite() && y.is_finite() {
            Ok((x, y))
        } else {
            Err(GeoLiteralError::Projection(format!(
                "non-finite result ({x}, {y})"
            )))
        }
    }
}

fn definition(srid: Srid, registry: &ProjectionRegistry) -> Result<String> {
    registry
        .get(srid)
        .ok_or_else(|| GeoLiteralError::Projection(format!("{srid} is not registered")))
}

fn parse_definition(srid: Srid, definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|err| {
        GeoLiteralError::Projection(format!("invalid definition for {srid}: {err:?}"))
    })
}

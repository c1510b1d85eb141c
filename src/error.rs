//! Defines [`GeoLiteralError`], representing all errors returned by this crate.

use thiserror::Error;

use crate::crs::Srid;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoLiteralError {
    /// The WKT body of a literal could not be parsed or converted.
    #[error("WKT error: {0}")]
    Wkt(String),

    /// [geojson::Error]
    #[error(transparent)]
    GeoJson(#[from] geojson::Error),

    /// A GeoJSON literal parsed, but did not hold a geometry.
    #[error("Expected a GeoJSON geometry, found {0}")]
    UnexpectedGeoJson(String),

    /// [serde_json::Error]
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A projection definition for `srid` could not be resolved from its source.
    #[error("Could not resolve projection definition for {srid}: {reason}")]
    ProjectionLookup { srid: Srid, reason: String },

    /// [reqwest::Error]
    #[cfg(feature = "http")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A registered definition could not be applied to a coordinate.
    #[error("Projection error: {0}")]
    Projection(String),

    /// A CRS key that is not of the form `EPSG:<code>`.
    #[error("Invalid SRID: {0}")]
    InvalidSrid(String),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoLiteralError>;

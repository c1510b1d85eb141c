//! Spatial reference identifiers and the CRS URIs that appear in front of WKT literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeoLiteralError;

/// URI of OGC CRS84: WGS84 with longitude first, the axis order GeoJSON uses natively.
pub const CRS84_URI: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Prefix of EPSG CRS URIs as written by GeoSPARQL stores, e.g.
/// `http://www.opengis.net/def/crs/EPSG/0/31370`.
pub const EPSG_URI_PREFIX: &str = "http://www.opengis.net/def/crs/EPSG/0/";

/// A numeric spatial reference identifier.
///
/// Its canonical textual key is `EPSG:<code>`, which is what [`Display`][fmt::Display]
/// produces and [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Srid(pub u32);

impl Srid {
    /// WGS84 geographic coordinates, the output CRS of this crate.
    pub const WGS84: Srid = Srid(4326);

    pub fn code(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Srid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Srid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for Srid {
    type Err = GeoLiteralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .strip_prefix("EPSG:")
            .ok_or_else(|| GeoLiteralError::InvalidSrid(s.to_string()))?;
        code.parse::<u32>()
            .map(Srid)
            .map_err(|_| GeoLiteralError::InvalidSrid(s.to_string()))
    }
}

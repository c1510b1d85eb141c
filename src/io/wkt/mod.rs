//! Read geometry literals written as WKT, optionally prefixed with a CRS.
//!
//! Literals come in four shapes:
//!
//! - bare WKT, `POINT(4.35 50.85)`
//! - EWKT-style, `SRID=31370;POINT(150000 170000)`
//! - GeoSPARQL style, `<http://www.opengis.net/def/crs/EPSG/0/31370> POINT(150000 170000)`
//! - GeoSPARQL CRS84, `<http://www.opengis.net/def/crs/OGC/1.3/CRS84> POINT(4.35 50.85)`
//!
//! [`normalize`] folds these into either bare WKT or the `SRID=<n>;` form, [`split_srid`]
//! separates the SRID from the body, and [`parse_wkt`] turns the body into GeoJSON.

mod normalize;
mod parse;

pub use normalize::{normalize, split_srid};
pub use parse::parse_wkt;

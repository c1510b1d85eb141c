//! Read geometry literals that are already GeoJSON.

pub use reader::{empty_point, is_empty_point, parse_geojson};

mod reader;

//! Readers for the literal encodings found in query results: WKT (with or without a CRS
//! prefix), GeoJSON, and the SPARQL JSON results document that carries them.

pub mod geojson;
pub mod sparql;
pub mod wkt;

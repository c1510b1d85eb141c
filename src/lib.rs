//! Convert geometry literals from SPARQL query results into GeoJSON ready for a map.
//!
//! Literals arrive as WKT, as WKT prefixed with an SRID (`SRID=31370;POINT(...)`) or a CRS URI
//! (`<http://www.opengis.net/def/crs/EPSG/0/31370> POINT(...)`), or as GeoJSON text. Every
//! geometry is returned longitude first in WGS84, reprojected with the PROJ.4 definition
//! registered for its SRID. Definitions that are not built in are fetched in the background
//! the first time they are needed.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use geoliteral::io::sparql::SparqlResults;
//! use geoliteral::{LiteralConverter, ProjectionRegistry};
//!
//! # fn main() -> geoliteral::error::Result<()> {
//! let results = SparqlResults::from_json_str(r#"{"head": {"vars": []}, "results": {"bindings": []}}"#)?;
//! let converter = LiteralConverter::new(Arc::new(ProjectionRegistry::offline()));
//! for layer in converter.build_layers(results.rows()) {
//!     println!("{}: {}", layer.column, layer.collection.features.len());
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub use columns::{detect_geometry_columns, GeometryColumn};
pub use convert::{Converter, DatatypeTable, GeometryLayer, LiteralConverter};
pub use crs::Srid;
pub use options::ConverterOptions;
pub use registry::ProjectionRegistry;

pub mod algorithm;
pub mod columns;
pub mod convert;
pub mod crs;
pub mod error;
pub mod io;
pub mod options;
pub mod registry;

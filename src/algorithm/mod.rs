//! Algorithms on GeoJSON geometries.

pub mod proj;

pub use proj::{reproject, reproject_lon_lat, CoordTransform, Reproject};

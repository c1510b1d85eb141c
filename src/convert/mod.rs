//! Turn result rows into GeoJSON feature collections.
//!
//! [`LiteralConverter`] picks a [`Converter`] for each cell from its datatype, runs it, and
//! reprojects WKT geometries whose CRS is known. Conversion never waits on the network: when a
//! literal references an SRID the registry does not know yet, the lookup is started in the
//! background and the geometry is returned unprojected. Converting the same rows again once
//! the lookup has finished yields projected output.

mod datatype;

pub use datatype::{Converter, DatatypeTable, GEOJSON_LITERAL, VIRTRDF_GEOMETRY, WKT_LITERAL};

use std::sync::Arc;

use futures::future::join_all;
use geojson::{Feature, FeatureCollection, Geometry};
use itertools::Itertools;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::algorithm::{reproject, reproject_lon_lat};
use crate::columns::detect_geometry_columns;
use crate::crs::Srid;
use crate::error::Result;
use crate::io::geojson::{empty_point, parse_geojson};
use crate::io::sparql::{row_properties, ResultRow, Term, TypedLiteral};
use crate::io::wkt::{normalize, parse_wkt, split_srid};
use crate::options::ConverterOptions;
use crate::registry::{DefinitionSource, ProjectionRegistry};

/// The features built from one geometry column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryLayer {
    pub column: String,
    pub datatype: String,
    pub collection: FeatureCollection,
}

/// Converts geometry literals to GeoJSON in the target CRS.
#[derive(Debug, Clone)]
pub struct LiteralConverter {
    registry: Arc<ProjectionRegistry>,
    datatypes: DatatypeTable,
    target: Srid,
}

impl LiteralConverter {
    /// Create a converter with the default datatypes, producing WGS84 longitude/latitude.
    pub fn new(registry: Arc<ProjectionRegistry>) -> Self {
        Self {
            registry,
            datatypes: DatatypeTable::default(),
            target: Srid::WGS84,
        }
    }

    /// Build the registry and converter described by `options`, resolving unknown SRIDs over
    /// HTTP.
    #[cfg(feature = "http")]
    pub fn from_options(options: &ConverterOptions) -> Result<Self> {
        let source = crate::registry::HttpDefinitionSource::new(
            options.projection_registry_url.as_str(),
            options.request_timeout(),
        )?;
        Ok(Self::from_options_with_source(options, Arc::new(source)))
    }

    /// Build the registry and converter described by `options`, resolving unknown SRIDs
    /// through `source`.
    pub fn from_options_with_source(
        options: &ConverterOptions,
        source: Arc<dyn DefinitionSource>,
    ) -> Self {
        let registry = ProjectionRegistry::new(source);
        for (code, definition) in &options.projections {
            registry.register(Srid(*code), definition.as_str());
        }
        Self {
            registry: Arc::new(registry),
            datatypes: options.datatype_table(),
            target: options.target_srid,
        }
    }

    pub fn with_datatypes(self, datatypes: DatatypeTable) -> Self {
        Self { datatypes, ..self }
    }

    pub fn with_target(self, target: Srid) -> Self {
        Self { target, ..self }
    }

    pub fn registry(&self) -> &Arc<ProjectionRegistry> {
        &self.registry
    }

    pub fn datatypes(&self) -> &DatatypeTable {
        &self.datatypes
    }

    pub fn target(&self) -> Srid {
        self.target
    }

    /// Convert a single literal. An unsupported datatype yields the empty point.
    pub fn convert(&self, literal: TypedLiteral<'_>) -> Result<Geometry> {
        match self.datatypes.converter_for(literal.datatype) {
            Converter::Wkt => self.convert_wkt(literal.value),
            Converter::GeoJson => Ok(self.lon_lat_to_target(&parse_geojson(literal.value)?)),
            Converter::Unsupported => Ok(empty_point()),
        }
    }

    /// Convert a WKT literal with an optional CRS prefix.
    ///
    /// The geometry is reprojected only if its SRID is registered at the time of the call.
    /// Otherwise a background lookup is started and the parsed coordinates are returned as
    /// written. Literals without an SRID, CRS84 ones included, are longitude/latitude.
    pub fn convert_wkt(&self, text: &str) -> Result<Geometry> {
        let normalized = normalize(text);
        let (srid, body) = split_srid(&normalized);
        if let Some(srid) = srid {
            self.request_definition(srid);
        }

        let geometry = parse_wkt(body)?;
        match srid {
            Some(srid) if self.registry.has(srid) => {
                self.request_definition(self.target);
                Ok(reproject(&geometry, srid, self.target, &self.registry))
            }
            Some(_) => Ok(geometry),
            None => Ok(self.lon_lat_to_target(&geometry)),
        }
    }

    /// Build one feature per row from the cell at `column`.
    ///
    /// Cells that are missing, not typed literals, or fail to convert become the empty point,
    /// so the collection always has one feature per row, in row order. Each feature carries the
    /// whole row as its properties.
    pub fn build_feature_collection(&self, rows: &[ResultRow], column: &str) -> FeatureCollection {
        let features = rows
            .iter()
            .map(|row| Feature {
                bbox: None,
                geometry: Some(self.convert_cell(row.get(column), column)),
                id: None,
                properties: Some(row_properties(row)),
                foreign_members: None,
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Build a feature collection for every geometry column detected in `rows`.
    pub fn build_layers(&self, rows: &[ResultRow]) -> Vec<GeometryLayer> {
        detect_geometry_columns(rows, &self.datatypes)
            .into_iter()
            .map(|column| GeometryLayer {
                collection: self.build_feature_collection(rows, &column.column),
                column: column.column,
                datatype: column.datatype,
            })
            .collect()
    }

    /// Whether `rows` have at least one geometry column.
    pub fn can_handle(&self, rows: &[ResultRow]) -> bool {
        !detect_geometry_columns(rows, &self.datatypes).is_empty()
    }

    /// Resolve every unknown SRID referenced by WKT cells in the geometry columns of `rows`,
    /// waiting for all lookups to finish.
    ///
    /// Hosts that would rather delay the first draw than show unprojected geometries call this
    /// before converting.
    pub async fn prefetch_projections(&self, rows: &[ResultRow]) {
        let columns = detect_geometry_columns(rows, &self.datatypes);
        let srids: Vec<Srid> = rows
            .iter()
            .flat_map(|row| {
                columns
                    .iter()
                    .filter_map(move |column| row.get(&column.column))
            })
            .filter_map(Term::as_typed_literal)
            .filter(|literal| self.datatypes.converter_for(literal.datatype) == Converter::Wkt)
            .filter_map(|literal| split_srid(&normalize(literal.value)).0)
            .chain((!columns.is_empty()).then_some(self.target))
            .unique()
            .filter(|srid| !self.registry.has(*srid))
            .collect();

        join_all(
            srids
                .into_iter()
                .map(|srid| self.registry.ensure_registered(srid)),
        )
        .await;
    }

    fn convert_cell(&self, cell: Option<&Term>, column: &str) -> Geometry {
        let Some(literal) = cell.and_then(Term::as_typed_literal) else {
            return empty_point();
        };
        self.convert(literal).unwrap_or_else(|err| {
            warn!(column, "Failed to convert geometry literal: {err}");
            empty_point()
        })
    }

    fn lon_lat_to_target(&self, geometry: &Geometry) -> Geometry {
        self.request_definition(self.target);
        reproject_lon_lat(geometry, self.target, &self.registry)
    }

    /// Start resolving `srid` in the background, without waiting for the result.
    fn request_definition(&self, srid: Srid) {
        if self.registry.has(srid) {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let registry = Arc::clone(&self.registry);
                handle.spawn(async move { registry.ensure_registered(srid).await });
            }
            Err(_) => debug!("No async runtime, not resolving {srid}"),
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use approx::assert_relative_eq;
    use geojson::Value;

    use super::*;
    use crate::io::geojson::is_empty_point;
    use crate::test::rows::{geojson_row, row, wkt_row};
    use crate::test::source::CountingSource;

    fn converter() -> LiteralConverter {
        LiteralConverter::new(Arc::new(ProjectionRegistry::offline()))
    }

    fn point_coords(geometry: &Geometry) -> Vec<f64> {
        match &geometry.value {
            Value::Point(position) => position.clone(),
            other => panic!("expected a point, got {other:?}"),
        }
    }

    #[test]
    fn bare_wkt_is_not_reprojected() {
        let geometry = converter()
            .convert(TypedLiteral::new("POINT(4.5 50.5)", WKT_LITERAL))
            .unwrap();
        assert_eq!(geometry, Geometry::new(Value::Point(vec![4.5, 50.5])));
    }

    #[test]
    fn crs84_is_not_reprojected() {
        let geometry = converter()
            .convert_wkt("<http://www.opengis.net/def/crs/OGC/1.3/CRS84> POINT(4.5 50.5)")
            .unwrap();
        assert_eq!(point_coords(&geometry), [4.5, 50.5]);
    }

    #[test]
    fn epsg_4326_uri_is_swapped() {
        let geometry = converter()
            .convert_wkt("<http://www.opengis.net/def/crs/EPSG/0/4326> POINT(50.5 4.5)")
            .unwrap();
        assert_eq!(point_coords(&geometry), [4.5, 50.5]);
    }

    #[test]
    fn registered_srid_is_reprojected() {
        let geometry = converter()
            .convert(TypedLiteral::new(
                "SRID=31370;POINT(150000 500000)",
                VIRTRDF_GEOMETRY,
            ))
            .unwrap();
        let coords = point_coords(&geometry);
        assert_relative_eq!(coords[0], 4.367486, epsilon = 1e-5);
        assert_relative_eq!(coords[1], 53.804855, epsilon = 1e-5);
    }

    #[test]
    fn unknown_srid_without_runtime_is_unprojected() {
        let converter = converter();
        let geometry = converter.convert_wkt("SRID=9999;POINT(1000 2000)").unwrap();
        assert_eq!(point_coords(&geometry), [1000.0, 2000.0]);
        assert!(!converter.registry().has(Srid(9999)));
    }

    #[tokio::test]
    async fn unknown_srid_resolves_for_the_next_draw() {
        let source = Arc::new(CountingSource::resolving(
            "+proj=utm +zone=31 +ellps=GRS80 +units=m +no_defs",
        ));
        let converter = LiteralConverter::new(Arc::new(ProjectionRegistry::new(source.clone())));
        let literal = "<http://www.opengis.net/def/crs/EPSG/0/25831> POINT(500000 5000000)";

        let first = converter.convert_wkt(literal).unwrap();
        assert_eq!(point_coords(&first), [500000.0, 5000000.0]);

        // only the lookup spawned by the conversion runs here
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(converter.registry().has(Srid(25831)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let second = converter.convert_wkt(literal).unwrap();
        assert_relative_eq!(point_coords(&second)[0], 3.0, epsilon = 1e-6);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_conversions_share_one_lookup() {
        let source = Arc::new(CountingSource::resolving("+proj=longlat +ellps=GRS80").delayed());
        let converter = LiteralConverter::new(Arc::new(ProjectionRegistry::new(source.clone())));
        for _ in 0..5 {
            converter.convert_wkt("SRID=4937;POINT(50 4)").unwrap();
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(converter.registry().has(Srid(4937)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_geometry_and_registry() {
        let source = Arc::new(CountingSource::failing());
        let converter = LiteralConverter::new(Arc::new(ProjectionRegistry::new(source)));

        let geometry = converter.convert_wkt("SRID=9999;POINT(1000 2000)").unwrap();
        assert_eq!(point_coords(&geometry), [1000.0, 2000.0]);

        converter.registry().ensure_registered(Srid(9999)).await;
        assert!(!converter.registry().has(Srid(9999)));
    }

    #[test]
    fn projected_target_applies_to_every_literal_kind() {
        let converter = converter().with_target(Srid(3857));
        let geometries = [
            converter.convert_wkt("POINT(4.5 50.5)").unwrap(),
            converter
                .convert_wkt("<http://www.opengis.net/def/crs/OGC/1.3/CRS84> POINT(4.5 50.5)")
                .unwrap(),
            converter.convert_wkt("SRID=4326;POINT(50.5 4.5)").unwrap(),
            converter
                .convert(TypedLiteral::new(
                    r#"{"type":"Point","coordinates":[4.5,50.5]}"#,
                    GEOJSON_LITERAL,
                ))
                .unwrap(),
        ];
        for geometry in &geometries {
            let coords = point_coords(geometry);
            assert_relative_eq!(coords[0], 500937.7, epsilon = 0.1);
            assert_relative_eq!(coords[1], 6533321.6, epsilon = 1.0);
        }
    }

    #[tokio::test]
    async fn unknown_target_is_looked_up() {
        let source = Arc::new(CountingSource::resolving(
            "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 +x_0=700000 +y_0=6600000 +ellps=GRS80 +units=m +no_defs",
        ));
        let converter = LiteralConverter::new(Arc::new(ProjectionRegistry::new(source.clone())))
            .with_target(Srid(2154));

        let first = converter.convert_wkt("POINT(3 46.5)").unwrap();
        assert_eq!(point_coords(&first), [3.0, 46.5]);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let second = converter.convert_wkt("POINT(3 46.5)").unwrap();
        assert_relative_eq!(point_coords(&second)[0], 700000.0, epsilon = 1.0);
        assert_relative_eq!(point_coords(&second)[1], 6600000.0, epsilon = 1.0);
    }

    #[test]
    fn geojson_passthrough() {
        let geometry = converter()
            .convert(TypedLiteral::new(
                r#"{"type":"Point","coordinates":[1,2]}"#,
                GEOJSON_LITERAL,
            ))
            .unwrap();
        assert_eq!(geometry, Geometry::new(Value::Point(vec![1.0, 2.0])));
    }

    #[test]
    fn unsupported_datatype_is_empty_point() {
        let geometry = converter()
            .convert(TypedLiteral::new(
                "POINT(1 2)",
                "http://www.w3.org/2001/XMLSchema#string",
            ))
            .unwrap();
        assert!(is_empty_point(&geometry));
    }

    #[test]
    fn collection_keeps_cardinality_and_order() {
        let rows = vec![
            wkt_row("POINT(1 1)"),
            wkt_row("POINT(broken"),
            geojson_row("{ nope"),
            row(&[("other", Term::typed_literal("x", "urn:unknown"))]),
            wkt_row("POINT(5 5)"),
        ];
        let collection = converter().build_feature_collection(&rows, "geom");
        assert_eq!(collection.features.len(), rows.len());

        let geometries: Vec<Geometry> = collection
            .features
            .iter()
            .map(|feature| feature.geometry.clone().unwrap())
            .collect();
        assert_eq!(point_coords(&geometries[0]), [1.0, 1.0]);
        assert!(is_empty_point(&geometries[1]));
        assert!(is_empty_point(&geometries[2]));
        assert!(is_empty_point(&geometries[3]));
        assert_eq!(point_coords(&geometries[4]), [5.0, 5.0]);

        let properties = collection.features[4].properties.as_ref().unwrap();
        assert_eq!(properties["geom"]["value"], "POINT(5 5)");
    }

    #[test]
    fn all_failures_still_yield_every_feature() {
        let rows: Vec<ResultRow> = (0..4).map(|_| wkt_row("NOT WKT")).collect();
        let collection = converter().build_feature_collection(&rows, "geom");
        assert_eq!(collection.features.len(), 4);
        assert!(collection
            .features
            .iter()
            .all(|feature| feature.geometry.as_ref().is_some_and(is_empty_point)));
    }

    #[test]
    fn layers_per_geometry_column() {
        let rows = vec![row(&[
            ("name", Term::typed_literal("Brussels", "http://www.w3.org/2001/XMLSchema#string")),
            ("wkt", Term::typed_literal("POINT(4.35 50.85)", WKT_LITERAL)),
            ("json", Term::typed_literal(r#"{"type":"Point","coordinates":[4.35,50.85]}"#, GEOJSON_LITERAL)),
        ])];
        let converter = converter();
        assert!(converter.can_handle(&rows));

        let layers = converter.build_layers(&rows);
        let columns: Vec<&str> = layers.iter().map(|layer| layer.column.as_str()).collect();
        assert_eq!(columns, ["wkt", "json"]);
        assert_eq!(layers[1].datatype, GEOJSON_LITERAL);
        assert_eq!(layers[0].collection.features.len(), 1);

        assert!(!converter.can_handle(&[]));
    }

    #[tokio::test]
    async fn prefetch_resolves_each_srid_once() {
        let source = Arc::new(CountingSource::resolving("+proj=longlat +ellps=GRS80 +no_defs"));
        let converter = LiteralConverter::new(Arc::new(ProjectionRegistry::new(source.clone())));
        let rows = vec![
            wkt_row("SRID=4937;POINT(4 50)"),
            wkt_row("<http://www.opengis.net/def/crs/EPSG/0/4937> POINT(5 51)"),
            wkt_row("SRID=31370;POINT(150000 170000)"),
            wkt_row("POINT(1 2)"),
        ];
        converter.prefetch_projections(&rows).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(converter.registry().has(Srid(4937)));
    }

    #[test]
    fn configured_datatypes_and_projections() {
        let options = ConverterOptions::from_json_str(
            r#"{
                "datatypes": { "http://example.org/ewkt": "wkt" },
                "projections": { "2154": "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 +x_0=700000 +y_0=6600000 +ellps=GRS80 +units=m +no_defs" }
            }"#,
        )
        .unwrap();
        let converter =
            LiteralConverter::from_options_with_source(&options, Arc::new(CountingSource::failing()));
        assert!(converter.registry().has(Srid(2154)));

        let geometry = converter
            .convert(TypedLiteral::new(
                "SRID=2154;POINT(700000 6600000)",
                "http://example.org/ewkt",
            ))
            .unwrap();
        let coords = point_coords(&geometry);
        assert_relative_eq!(coords[0], 3.0, epsilon = 1e-6);
        assert_relative_eq!(coords[1], 46.5, epsilon = 1e-2);
    }
}

use std::collections::HashMap;

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// GeoSPARQL WKT literal.
pub const WKT_LITERAL: &str = "http://www.opengis.net/ont/geosparql#wktLiteral";

/// Geometry literal emitted by Virtuoso.
pub const VIRTRDF_GEOMETRY: &str = "http://www.openlinksw.com/schemas/virtrdf#Geometry";

/// GeoSPARQL GeoJSON literal.
pub const GEOJSON_LITERAL: &str = "http://www.opengis.net/ont/geosparql#geoJSONLiteral";

static DEFAULT_DATATYPES: phf::Map<&'static str, Converter> = phf_map! {
    "http://www.opengis.net/ont/geosparql#wktLiteral" => Converter::Wkt,
    "http://www.openlinksw.com/schemas/virtrdf#Geometry" => Converter::Wkt,
    "http://www.opengis.net/ont/geosparql#geoJSONLiteral" => Converter::GeoJson,
};

/// How the value of a literal is turned into a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Converter {
    /// WKT, optionally CRS-prefixed. May trigger a projection lookup.
    Wkt,
    /// GeoJSON text, parsed as is.
    GeoJson,
    /// No conversion; the cell becomes the empty point.
    Unsupported,
}

/// Maps literal datatype URIs to a [`Converter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeTable {
    converters: HashMap<String, Converter>,
}

impl DatatypeTable {
    /// A table without any datatype.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    pub fn insert(&mut self, datatype: impl Into<String>, converter: Converter) {
        self.converters.insert(datatype.into(), converter);
    }

    pub fn converter_for(&self, datatype: &str) -> Converter {
        self.converters
            .get(datatype)
            .copied()
            .unwrap_or(Converter::Unsupported)
    }

    pub fn is_supported(&self, datatype: &str) -> bool {
        self.converter_for(datatype) != Converter::Unsupported
    }
}

impl Default for DatatypeTable {
    fn default() -> Self {
        let converters = DEFAULT_DATATYPES
            .entries()
            .map(|(datatype, converter)| (datatype.to_string(), *converter))
            .collect();
        Self { converters }
    }
}

impl<S: Into<String>> Extend<(S, Converter)> for DatatypeTable {
    fn extend<T: IntoIterator<Item = (S, Converter)>>(&mut self, iter: T) {
        for (datatype, converter) in iter {
            self.insert(datatype, converter);
        }
    }
}

//! Configuration for building a [`LiteralConverter`][crate::LiteralConverter].

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::convert::{Converter, DatatypeTable};
use crate::crs::Srid;
use crate::error::Result;
use crate::registry::DEFAULT_REGISTRY_URL;

/// Options for converting geometry literals.
///
/// Every field has a default, so a configuration file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterOptions {
    /// Base URL serving `/<code>.proj4` definitions for SRIDs that are not built in.
    pub projection_registry_url: String,

    /// Timeout of a single definition request, in seconds.
    pub request_timeout_secs: u64,

    /// The CRS geometries are converted to.
    pub target_srid: Srid,

    /// Datatypes handled in addition to the GeoSPARQL and Virtuoso defaults. Mapping a default
    /// datatype to `"unsupported"` disables it.
    pub datatypes: BTreeMap<String, Converter>,

    /// PROJ.4 definitions registered at start-up, by SRID.
    pub projections: BTreeMap<u32, String>,
}

impl ConverterOptions {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The default datatypes extended with [`datatypes`][Self::datatypes].
    pub fn datatype_table(&self) -> DatatypeTable {
        let mut table = DatatypeTable::default();
        table.extend(
            self.datatypes
                .iter()
                .map(|(datatype, converter)| (datatype.as_str(), *converter)),
        );
        table
    }
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            projection_registry_url: DEFAULT_REGISTRY_URL.to_string(),
            request_timeout_secs: 10,
            target_srid: Srid::WGS84,
            datatypes: BTreeMap::new(),
            projections: BTreeMap::new(),
        }
    }
}

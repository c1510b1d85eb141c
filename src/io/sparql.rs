//! The [SPARQL 1.1 Query Results JSON](https://www.w3.org/TR/sparql11-results-json/) shapes
//! this crate reads rows from.

use std::io::Read;

use geojson::JsonObject;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of a result set, keyed by variable name.
pub type ResultRow = IndexMap<String, Term>;

/// A single RDF term bound to a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Term {
    Uri {
        value: String,
    },
    /// A literal, optionally typed or language-tagged.
    ///
    /// Some stores still emit the pre-standard `"typed-literal"` tag, which is read as a literal.
    #[serde(alias = "typed-literal")]
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(
            rename = "xml:lang",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        lang: Option<String>,
    },
    Bnode {
        value: String,
    },
}

impl Term {
    /// Construct a typed literal term.
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Term::Uri { value } | Term::Literal { value, .. } | Term::Bnode { value } => value,
        }
    }

    /// View this term as a [`TypedLiteral`], if it is a literal with a datatype.
    pub fn as_typed_literal(&self) -> Option<TypedLiteral<'_>> {
        match self {
            Term::Literal {
                value,
                datatype: Some(datatype),
                ..
            } => Some(TypedLiteral { value, datatype }),
            _ => None,
        }
    }
}

/// A borrowed `{ value, datatype }` pair taken from a result cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedLiteral<'a> {
    pub value: &'a str,
    pub datatype: &'a str,
}

impl<'a> TypedLiteral<'a> {
    pub fn new(value: &'a str, datatype: &'a str) -> Self {
        Self { value, datatype }
    }
}

/// A full SELECT results document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    pub head: Head,
    pub results: Bindings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    #[serde(default)]
    pub bindings: Vec<ResultRow>,
}

impl SparqlResults {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.results.bindings
    }
}

/// Serialize a whole row into GeoJSON feature properties.
pub(crate) fn row_properties(row: &ResultRow) -> JsonObject {
    row.iter()
        .map(|(name, term)| {
            let value = serde_json::to_value(term).unwrap_or_default();
            (name.clone(), value)
        })
        .collect()
}

//! Decide which columns of a result set hold geometry literals.

use serde::{Deserialize, Serialize};

use crate::convert::DatatypeTable;
use crate::io::sparql::ResultRow;

/// A column whose first value is a literal with a convertible datatype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryColumn {
    pub column: String,
    pub datatype: String,
}

/// Find the geometry columns of `rows`, in column order.
///
/// Only the first row is inspected. Later rows may hold other datatypes in the same column;
/// those cells are handled one by one during conversion.
pub fn detect_geometry_columns(
    rows: &[ResultRow],
    datatypes: &DatatypeTable,
) -> Vec<GeometryColumn> {
    let Some(first) = rows.first() else {
        return vec![];
    };
    first
        .iter()
        .filter_map(|(column, term)| {
            let literal = term.as_typed_literal()?;
            datatypes
                .is_supported(literal.datatype)
                .then(|| GeometryColumn {
                    column: column.clone(),
                    datatype: literal.datatype.to_string(),
                })
        })
        .collect()
}

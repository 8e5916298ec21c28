//! Column-header reconciliation between flat and multi-level naming.
//!
//! Measurement files written with several header rows carry multi-level
//! column labels, e.g. a channel name spanning a group of sub-measurements.
//! [`collapse`] joins such labels into flat, unambiguous names so the table
//! can be grouped and persisted; [`inflate`] is the structural inverse,
//! splitting flat names back into levels.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::table::{Header, Table};

/// Separator used when collapsing multi-level labels into flat names.
pub const COLLAPSE_SEPARATOR: &str = "_";

/// Separator assumed in flat names that encode multiple levels.
pub const INFLATE_SEPARATOR: &str = " ";

/// Joins each column's multi-level labels into a single flat name.
///
/// Per-level labels are joined with `separator` and the result is trimmed of
/// surrounding whitespace. Two columns collapsing to the same flat name is a
/// hard error rather than a silent overwrite, since a non-unique name would
/// drop a column further down the pipeline.
pub fn collapse(table: &Table, separator: &str) -> Result<Table> {
    let labels = match table.header() {
        Header::Multi(labels) => labels,
        Header::Flat(_) => {
            return Err(Error::HeaderShape(
                "collapse requires multi-level column labels".to_string(),
            ))
        }
    };

    let mut names = Vec::with_capacity(labels.len());
    let mut seen = HashSet::new();
    for parts in labels {
        let name = parts.join(separator).trim().to_string();
        if !seen.insert(name.clone()) {
            return Err(Error::DuplicateColumnName(name));
        }
        names.push(name);
    }

    Table::new(Header::Flat(names), table.columns.clone())
}

/// Splits each flat column name on `separator` into multi-level labels.
///
/// Every name must split into the same number of parts, and that number must
/// be at least two; anything else means the flat names do not encode a
/// uniform hierarchy and the header shape is reported as an error.
pub fn inflate(table: &Table, separator: &str) -> Result<Table> {
    let names = match table.header() {
        Header::Flat(names) => names,
        Header::Multi(_) => {
            return Err(Error::HeaderShape(
                "inflate requires flat column names".to_string(),
            ))
        }
    };

    let mut labels: Vec<Vec<String>> = Vec::with_capacity(names.len());
    let mut depth: Option<usize> = None;
    for name in names {
        let parts: Vec<String> = name.split(separator).map(str::to_string).collect();
        match depth {
            None => depth = Some(parts.len()),
            Some(expected) if expected != parts.len() => {
                return Err(Error::HeaderShape(format!(
                    "column '{}' splits into {} parts, expected {}",
                    name,
                    parts.len(),
                    expected
                )));
            }
            Some(_) => {}
        }
        labels.push(parts);
    }

    if depth.unwrap_or(0) < 2 {
        return Err(Error::HeaderShape(format!(
            "column names do not contain the separator '{}'",
            separator
        )));
    }

    Table::new(Header::Multi(labels), table.columns.clone())
}

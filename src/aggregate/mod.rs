//! Per-group aggregation of replicate measurements.
//!
//! A flat-named table holds one row per replicate observation. Aggregation
//! partitions its columns into metadata (identifier columns passed through
//! unchanged per group) and measurements (reduced by a statistic per group),
//! then emits one row per distinct value of the grouping column. Groups keep
//! the order in which their key first occurs.

use std::collections::HashMap;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::{Cell, Header, Table};

lazy_static! {
    /// Conventional identifier labels treated as metadata by default.
    pub static ref DEFAULT_METADATA_LABELS: Vec<String> = [
        "Metadata",
        "ImageNumber",
        "ObjectNumber",
        "TableNumber",
        "Plate",
        "Well",
        "Site",
    ]
    .iter()
    .map(|label| label.to_string())
    .collect();
}

/// Default grouping column, the per-image identifier.
pub const DEFAULT_GROUP_KEY: &str = "ImageNumber";

/// Statistic used to reduce a group of measurement values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMethod {
    Median,
    Mean,
}

impl FromStr for AggregateMethod {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "median" => Ok(AggregateMethod::Median),
            "mean" => Ok(AggregateMethod::Mean),
            other => Err(Error::UnsupportedMethod(other.to_string())),
        }
    }
}

/// How a column name is matched against the metadata labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataPolicy {
    /// The name must start with a label
    Prefix,
    /// A label may occur anywhere in the name
    Substring,
}

impl MetadataPolicy {
    fn matches(&self, column: &str, label: &str) -> bool {
        match self {
            MetadataPolicy::Prefix => column.starts_with(label),
            MetadataPolicy::Substring => column.contains(label),
        }
    }
}

/// What to do when a metadata column is not constant within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataConflict {
    /// Keep the value from the group's first row
    FirstRowWins,
    /// Fail the aggregation
    Fail,
}

/// Options for one aggregation call.
///
/// The set is disjoint from the CSV and merge option sets: the aggregator
/// consumes exactly these fields and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Column whose distinct values define the groups.
    pub group_key: String,
    /// Statistic applied to each measurement column per group.
    pub method: AggregateMethod,
    /// How metadata labels are matched against column names.
    pub policy: MetadataPolicy,
    /// Labels marking a column as metadata. The group key itself is always
    /// treated as metadata, whether or not it is listed here.
    pub metadata_labels: Vec<String>,
    /// Policy for metadata columns that vary within a group.
    pub on_conflict: MetadataConflict,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        AggregateOptions {
            group_key: DEFAULT_GROUP_KEY.to_string(),
            method: AggregateMethod::Median,
            policy: MetadataPolicy::Prefix,
            metadata_labels: DEFAULT_METADATA_LABELS.clone(),
            on_conflict: MetadataConflict::FirstRowWins,
        }
    }
}

impl AggregateOptions {
    /// Default options grouped by `group_key`.
    pub fn with_group_key(group_key: &str) -> Self {
        AggregateOptions {
            group_key: group_key.to_string(),
            ..AggregateOptions::default()
        }
    }

    fn is_metadata(&self, column: &str) -> bool {
        column == self.group_key
            || self
                .metadata_labels
                .iter()
                .any(|label| self.policy.matches(column, label))
    }
}

/// Reduces a table to one row per distinct value of the grouping column.
///
/// Metadata columns pass through with the first row's value per group (or are
/// verified constant under [`MetadataConflict::Fail`]); measurement columns
/// are reduced with the configured statistic, ignoring null cells. Column
/// order is preserved from the input.
pub fn aggregate(table: &Table, options: &AggregateOptions) -> Result<Table> {
    if table.row_count() == 0 {
        return Err(Error::EmptyData("no rows to aggregate".to_string()));
    }
    let names = match table.header() {
        Header::Flat(names) => names,
        Header::Multi(_) => {
            return Err(Error::HeaderShape(
                "aggregation requires flat column names; collapse the header first".to_string(),
            ))
        }
    };
    let key_idx = table
        .column_position(&options.group_key)
        .ok_or_else(|| Error::ColumnNotFound(options.group_key.clone()))?;

    // Stable grouping: groups appear in first-occurrence order of their key
    let key_column = table.column(key_idx);
    let mut group_keys: Vec<String> = Vec::new();
    let mut group_rows: Vec<Vec<usize>> = Vec::new();
    let mut group_of: HashMap<String, usize> = HashMap::new();
    for (row, cell) in key_column.iter().enumerate() {
        let key = cell.to_string();
        let slot = *group_of.entry(key.clone()).or_insert_with(|| {
            group_keys.push(key);
            group_rows.push(Vec::new());
            group_rows.len() - 1
        });
        group_rows[slot].push(row);
    }

    let is_metadata: Vec<bool> = names.iter().map(|name| options.is_metadata(name)).collect();

    let mut out_columns: Vec<Vec<Cell>> =
        vec![Vec::with_capacity(group_rows.len()); table.column_count()];
    for (rows, group) in group_rows.iter().zip(&group_keys) {
        for (col_idx, name) in names.iter().enumerate() {
            let column = table.column(col_idx);
            let cell = if is_metadata[col_idx] {
                metadata_value(column, rows, name, group, options.on_conflict)?
            } else {
                reduce(column, rows, name, options.method)?
            };
            out_columns[col_idx].push(cell);
        }
    }

    Table::new(Header::Flat(names.clone()), out_columns)
}

fn metadata_value(
    column: &[Cell],
    rows: &[usize],
    name: &str,
    group: &str,
    on_conflict: MetadataConflict,
) -> Result<Cell> {
    let first = column[rows[0]].clone();
    if on_conflict == MetadataConflict::Fail {
        for &row in &rows[1..] {
            if column[row] != first {
                return Err(Error::InconsistentMetadata {
                    column: name.to_string(),
                    group: group.to_string(),
                });
            }
        }
    }
    Ok(first)
}

fn reduce(column: &[Cell], rows: &[usize], name: &str, method: AggregateMethod) -> Result<Cell> {
    let mut values = Vec::with_capacity(rows.len());
    for &row in rows {
        match &column[row] {
            Cell::Number(value) => values.push(*value),
            Cell::Null => {}
            Cell::Text(text) => {
                return Err(Error::TypeError(format!(
                    "cannot aggregate non-numeric column '{}' (found '{}')",
                    name, text
                )))
            }
        }
    }
    if values.is_empty() {
        // A group with only missing observations aggregates to a missing value
        return Ok(Cell::Null);
    }
    let value = match method {
        AggregateMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregateMethod::Median => median(&mut values),
    };
    Ok(Cell::Number(value))
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

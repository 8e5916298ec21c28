//! Column-oriented table of scalar measurement values.
//!
//! A [`Table`] is the unit of work for the whole crate: the CSV reader
//! produces one, the header codec renames its columns, the aggregator reduces
//! its rows and the SQLite writer persists it. Tables are transient values,
//! no component holds on to one across calls.

use std::collections::HashMap;
use std::fmt::{self, Display};

use crate::error::{Error, Result};

/// A single scalar value in a table.
///
/// Absent values are represented by [`Cell::Null`]; numeric parsing happens
/// once at the CSV boundary, so aggregation never has to interpret strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
    /// Missing value
    Null,
}

impl Cell {
    /// Whether the cell holds no value.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell. `Null` is absent, text is a type error.
    pub fn as_number(&self) -> Result<Option<f64>> {
        match self {
            Cell::Number(value) => Ok(Some(*value)),
            Cell::Null => Ok(None),
            Cell::Text(text) => Err(Error::TypeError(format!(
                "expected a numeric value, found '{}'",
                text
            ))),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(value) => {
                // Integral values print without a trailing ".0" so group keys
                // read naturally ("1" rather than "1.0")
                if value.fract() == 0.0 && value.is_finite() && value.abs() < 9e15 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{}", value)
                }
            }
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Null => write!(f, "NA"),
        }
    }
}

/// Column labels of a table.
///
/// A table is labeled either with unique flat names or with multi-level
/// labels of uniform depth, never a mixture.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    /// One flat name per column
    Flat(Vec<String>),
    /// One label vector per column, all of the same length >= 2
    Multi(Vec<Vec<String>>),
}

impl Header {
    /// Number of columns labeled by this header.
    pub fn len(&self) -> usize {
        match self {
            Header::Flat(names) => names.len(),
            Header::Multi(labels) => labels.len(),
        }
    }

    /// Whether the header labels no columns.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of label levels (1 for a flat header).
    pub fn n_levels(&self) -> usize {
        match self {
            Header::Flat(_) => 1,
            Header::Multi(labels) => labels.first().map_or(0, |parts| parts.len()),
        }
    }
}

/// Column-oriented table with either flat or multi-level column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub(crate) header: Header,
    pub(crate) columns: Vec<Vec<Cell>>,
    // Flat name -> column position; empty for multi-level headers
    pub(crate) column_indices: HashMap<String, usize>,
    pub(crate) row_count: usize,
}

impl Table {
    /// Creates a table from a header and per-column cell vectors.
    ///
    /// Validates that the header labels exactly one name per column, that
    /// every column has the same length, that flat names are unique and that
    /// multi-level labels share a uniform depth of at least two.
    pub fn new(header: Header, columns: Vec<Vec<Cell>>) -> Result<Self> {
        if header.len() != columns.len() {
            return Err(Error::InvalidInput(format!(
                "header labels {} columns but {} were provided",
                header.len(),
                columns.len()
            )));
        }

        let row_count = columns.first().map_or(0, Vec::len);
        for column in &columns {
            if column.len() != row_count {
                return Err(Error::InconsistentRowCount {
                    expected: row_count,
                    found: column.len(),
                });
            }
        }

        let mut column_indices = HashMap::new();
        match &header {
            Header::Flat(names) => {
                for (idx, name) in names.iter().enumerate() {
                    if column_indices.insert(name.clone(), idx).is_some() {
                        return Err(Error::DuplicateColumnName(name.clone()));
                    }
                }
            }
            Header::Multi(labels) => {
                let depth = labels.first().map_or(0, |parts| parts.len());
                if !labels.is_empty() && depth < 2 {
                    return Err(Error::HeaderShape(format!(
                        "multi-level labels need at least 2 levels, found {}",
                        depth
                    )));
                }
                for parts in labels {
                    if parts.len() != depth {
                        return Err(Error::HeaderShape(format!(
                            "label {:?} has {} levels, expected {}",
                            parts,
                            parts.len(),
                            depth
                        )));
                    }
                }
            }
        }

        Ok(Table {
            header,
            columns,
            column_indices,
            row_count,
        })
    }

    /// Creates a flat-named table from row vectors, mainly for tests and
    /// small in-memory tables.
    pub fn from_rows<S: Into<String>>(names: Vec<S>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for row in rows {
            if row.len() != names.len() {
                return Err(Error::InconsistentRowCount {
                    expected: names.len(),
                    found: row.len(),
                });
            }
            for (idx, cell) in row.into_iter().enumerate() {
                columns[idx].push(cell);
            }
        }
        Table::new(Header::Flat(names), columns)
    }

    /// The table's column labels.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Flat column names, when the header is flat.
    pub fn flat_names(&self) -> Option<&[String]> {
        match &self.header {
            Header::Flat(names) => Some(names),
            Header::Multi(_) => None,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cells of the column at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` is out of range; positions obtained from
    /// [`Table::column_position`] are always valid.
    pub fn column(&self, idx: usize) -> &[Cell] {
        &self.columns[idx]
    }

    /// Position of a flat-named column, if present.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_indices.get(name).copied()
    }

    /// Cells of the flat-named column `name`.
    pub fn column_by_name(&self, name: &str) -> Result<&[Cell]> {
        self.column_position(name)
            .map(|idx| self.column(idx))
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }
}

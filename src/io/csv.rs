//! Reading measurement CSV files into tables.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::{Cell, Header, Table};

/// Options for reading one measurement CSV file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Number of header records at the top of the file. One header record
    /// yields a flat header, two or more yield a multi-level header.
    pub header_rows: usize,
    /// Trim whitespace around fields.
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            header_rows: 1,
            trim: true,
        }
    }
}

/// Reads a CSV file into a [`Table`].
///
/// Empty fields and `NaN` become [`Cell::Null`], fields parseable as a number
/// become [`Cell::Number`], everything else is kept as text.
pub fn read_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Table> {
    if options.header_rows == 0 {
        return Err(Error::InvalidInput(
            "header_rows must be at least 1".to_string(),
        ));
    }

    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(file);
    let mut records = reader.records();

    let mut header_records: Vec<Vec<String>> = Vec::with_capacity(options.header_rows);
    for _ in 0..options.header_rows {
        match records.next() {
            Some(record) => {
                let record = record?;
                header_records.push(record.iter().map(str::to_string).collect());
            }
            None => {
                return Err(Error::HeaderShape(format!(
                    "'{}': expected {} header records, file has fewer",
                    path.as_ref().display(),
                    options.header_rows
                )))
            }
        }
    }

    let column_count = header_records[0].len();
    for record in &header_records {
        if record.len() != column_count {
            return Err(Error::HeaderShape(format!(
                "'{}': header records differ in length ({} vs {})",
                path.as_ref().display(),
                record.len(),
                column_count
            )));
        }
    }

    let header = if options.header_rows == 1 {
        Header::Flat(header_records.swap_remove(0))
    } else {
        // Transpose the header records into one label vector per column
        let mut labels = vec![Vec::with_capacity(options.header_rows); column_count];
        for record in &header_records {
            for (col, part) in record.iter().enumerate() {
                labels[col].push(part.clone());
            }
        }
        Header::Multi(labels)
    };

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); column_count];
    for result in records {
        let record = result?;
        for (col, column) in columns.iter_mut().enumerate() {
            column.push(parse_cell(record.get(col).unwrap_or("")));
        }
    }

    Table::new(header, columns)
}

fn parse_cell(field: &str) -> Cell {
    if field.is_empty() || field.eq_ignore_ascii_case("nan") {
        Cell::Null
    } else if let Ok(value) = field.parse::<f64>() {
        Cell::Number(value)
    } else {
        Cell::Text(field.to_string())
    }
}

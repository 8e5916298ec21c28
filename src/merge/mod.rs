//! Orchestration: discover measurement files and merge them into the
//! results database.
//!
//! File discovery is an explicit step returning a plain list of paths; the
//! merge calls take that list as a parameter, so the header codec and the
//! aggregator stay pure and independently testable. Callers that parallelize
//! across files must still serialize writes through one [`Merger`], since
//! the database file is the only shared resource.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, AggregateOptions};
use crate::error::{Error, Result};
use crate::headers::{collapse, COLLAPSE_SEPARATOR};
use crate::io::csv::{read_csv, CsvOptions};
use crate::io::sql::Database;
use crate::table::Table;

/// Options for one merge pass over the discovered files.
///
/// Disjoint from [`AggregateOptions`]: nothing in here reaches the
/// aggregator, and nothing in the aggregation options reaches the reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOptions {
    /// File-name stem to select (`<select>.csv`), also the target table name.
    pub select: String,
    /// Number of header records in each file.
    pub header_rows: usize,
    /// Separator used when collapsing multi-level headers.
    pub separator: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            select: "DATA".to_string(),
            header_rows: 1,
            separator: COLLAPSE_SEPARATOR.to_string(),
        }
    }
}

/// Recursively collects every file below `directory`, sorted for
/// deterministic merge order.
pub fn find_files<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    walk(directory.as_ref(), &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn walk(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, paths)?;
        } else {
            paths.push(path);
        }
    }
    Ok(())
}

/// Merges measurement files into tables of a results database.
pub struct Merger {
    db: Database,
}

impl Merger {
    pub fn new(db: Database) -> Merger {
        Merger { db }
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Appends every matching file to the `<select>` table.
    ///
    /// Multi-level headers are collapsed with the configured separator before
    /// writing. Returns the number of files merged; the first failing file
    /// aborts the pass.
    pub fn to_db(&mut self, files: &[PathBuf], options: &MergeOptions) -> Result<usize> {
        let selected = select_files(files, &options.select)?;
        for path in &selected {
            let table = self.load(path, options)?;
            self.db.append(&options.select, &table)?;
            log::info!(
                "merged '{}' into table '{}'",
                path.display(),
                options.select
            );
        }
        Ok(selected.len())
    }

    /// Aggregates each matching file per group, then appends the result to
    /// the `<select>_agg` table.
    ///
    /// With collapsed headers the group key must be the collapsed column
    /// name, e.g. `Image_ImageNumber` rather than `ImageNumber`.
    pub fn to_db_agg(
        &mut self,
        files: &[PathBuf],
        options: &MergeOptions,
        agg: &AggregateOptions,
    ) -> Result<usize> {
        let selected = select_files(files, &options.select)?;
        let target = format!("{}_agg", options.select);
        for path in &selected {
            let table = self.load(path, options)?;
            let reduced = aggregate(&table, agg)?;
            self.db.append(&target, &reduced)?;
            log::info!("aggregated '{}' into table '{}'", path.display(), target);
        }
        Ok(selected.len())
    }

    fn load(&self, path: &Path, options: &MergeOptions) -> Result<Table> {
        let csv_options = CsvOptions {
            header_rows: options.header_rows,
            ..CsvOptions::default()
        };
        let table = read_csv(path, &csv_options).map_err(|err| {
            log::error!("failed to read '{}': {}", path.display(), err);
            err
        })?;
        if options.header_rows > 1 {
            collapse(&table, &options.separator)
        } else {
            Ok(table)
        }
    }
}

fn select_files(files: &[PathBuf], select: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!("{}.csv", select);
    let selected: Vec<PathBuf> = files
        .iter()
        .filter(|path| path.to_string_lossy().ends_with(&suffix))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(Error::InvalidInput(format!(
            "no files found matching '{}'",
            select
        )));
    }
    Ok(selected)
}

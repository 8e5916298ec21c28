//! Writing tables to the results SQLite database.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::error::{Error, Result};
use crate::table::{Cell, Header, Table};

/// Handle to the results database.
///
/// One SQLite file holds every merged table; repeated appends with compatible
/// schemas extend the same SQL table.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Opens `<location>/<name>.sqlite`, creating the file if necessary.
    ///
    /// The `.sqlite` extension is added when missing. If the file already
    /// exists the database is extended rather than overwritten, with a
    /// warning in the log.
    pub fn create<P: AsRef<Path>>(location: P, name: &str) -> Result<Database> {
        let mut file_name = name.to_string();
        if !file_name.ends_with(".sqlite") {
            file_name.push_str(".sqlite");
        }
        let path = location.as_ref().join(file_name);
        if path.is_file() {
            log::warn!(
                "'{}' already exists, database will be extended",
                path.display()
            );
        }
        let conn = Connection::open(&path)?;
        Ok(Database { conn, path })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a flat-named table to the SQL table `table_name`, creating it
    /// on first use.
    ///
    /// Column affinity (REAL or TEXT) is taken from the first non-null cell
    /// of each column; all rows of one call are inserted in a single
    /// transaction.
    pub fn append(&mut self, table_name: &str, table: &Table) -> Result<()> {
        let names = match table.header() {
            Header::Flat(names) => names,
            Header::Multi(_) => {
                return Err(Error::InvalidInput(
                    "cannot persist multi-level column labels; collapse the header first"
                        .to_string(),
                ))
            }
        };
        if names.is_empty() {
            return Err(Error::EmptyData("table has no columns".to_string()));
        }

        let definitions = names
            .iter()
            .enumerate()
            .map(|(idx, name)| format!("{} {}", quote_ident(name), affinity(table.column(idx))))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                quote_ident(table_name),
                definitions
            ),
            [],
        )?;

        let columns = names
            .iter()
            .map(|name| quote_ident(name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; names.len()].join(", ");
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table_name),
            columns,
            placeholders
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in 0..table.row_count() {
                let values = (0..table.column_count()).map(|col| to_sql(&table.column(col)[row]));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn affinity(column: &[Cell]) -> &'static str {
    for cell in column {
        match cell {
            Cell::Number(_) => return "REAL",
            Cell::Text(_) => return "TEXT",
            Cell::Null => {}
        }
    }
    "TEXT"
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql(cell: &Cell) -> Value {
    match cell {
        Cell::Number(value) => Value::Real(*value),
        Cell::Text(text) => Value::Text(text.clone()),
        Cell::Null => Value::Null,
    }
}

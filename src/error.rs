use thiserror::Error;

/// Error type covering every fallible operation in the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("SQLite error")]
    Sql(#[from] rusqlite::Error),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Header shape error: {0}")]
    HeaderShape(String),

    #[error("Unsupported aggregation method: {0}")]
    UnsupportedMethod(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Metadata column '{column}' varies within group '{group}'")]
    InconsistentMetadata { column: String, group: String },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

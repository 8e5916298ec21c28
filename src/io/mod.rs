pub mod csv;
pub mod sql;

// Re-export commonly used items
pub use csv::{read_csv, CsvOptions};
pub use sql::Database;

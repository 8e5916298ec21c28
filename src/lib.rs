//! platemeld consolidates per-plate image-analysis CSV output into named
//! tables of a single SQLite database.
//!
//! Measurement files scattered across a directory tree are discovered with
//! [`merge::find_files`], read into in-memory [`table::Table`]s, their
//! multi-level column headers collapsed to flat names ([`headers`]), and
//! optionally reduced to one row per image or sample ([`aggregate`]) before
//! being appended to the database ([`io::sql`]).
//!
//! ```no_run
//! use platemeld::{find_files, Database, MergeOptions, Merger};
//!
//! let files = find_files("/data/experiment").unwrap();
//! let db = Database::create("/data/experiment", "results").unwrap();
//! let mut merger = Merger::new(db);
//! merger.to_db(&files, &MergeOptions::default()).unwrap();
//! ```

pub mod aggregate;
pub mod error;
pub mod headers;
pub mod io;
pub mod merge;
pub mod table;

// Re-export commonly used types
pub use aggregate::{
    aggregate, AggregateMethod, AggregateOptions, MetadataConflict, MetadataPolicy,
};
pub use error::{Error, Result};
pub use headers::{collapse, inflate};
pub use io::csv::{read_csv, CsvOptions};
pub use io::sql::Database;
pub use merge::{find_files, MergeOptions, Merger};
pub use table::{Cell, Header, Table};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::fs;
use std::io::Write;
use std::path::Path;

use platemeld::aggregate::AggregateOptions;
use platemeld::error::Error;
use platemeld::io::sql::Database;
use platemeld::merge::{find_files, MergeOptions, Merger};
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

#[test]
fn test_find_files_recurses_and_sorts() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "plate2/DATA.csv", "a\n1\n");
    write_file(dir.path(), "plate1/DATA.csv", "a\n1\n");
    write_file(dir.path(), "plate1/IMAGE.csv", "a\n1\n");

    let files = find_files(dir.path()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|path| {
            path.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(
        names,
        vec!["plate1/DATA.csv", "plate1/IMAGE.csv", "plate2/DATA.csv"]
    );
}

#[test]
fn test_to_db_merges_matching_files() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "plate1/DATA.csv",
        "ImageNumber,val\n1,2\n1,4\n",
    );
    write_file(dir.path(), "plate2/DATA.csv", "ImageNumber,val\n1,10\n");
    // Different stem, must not be picked up
    write_file(dir.path(), "plate1/IMAGE.csv", "ImageNumber,count\n1,5\n");

    let files = find_files(dir.path()).unwrap();
    let db = Database::create(dir.path(), "results").unwrap();
    let mut merger = Merger::new(db);

    let merged = merger.to_db(&files, &MergeOptions::default()).unwrap();
    assert_eq!(merged, 2);

    let conn = rusqlite::Connection::open(merger.database().path()).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM DATA", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_to_db_collapses_multi_headers() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "plate1/DATA.csv",
        "Image,Cells\nImageNumber,Area\n1,40.5\n",
    );

    let files = find_files(dir.path()).unwrap();
    let db = Database::create(dir.path(), "results").unwrap();
    let mut merger = Merger::new(db);

    let options = MergeOptions {
        header_rows: 2,
        ..MergeOptions::default()
    };
    merger.to_db(&files, &options).unwrap();

    let conn = rusqlite::Connection::open(merger.database().path()).unwrap();
    let area: f64 = conn
        .query_row("SELECT Cells_Area FROM DATA", [], |row| row.get(0))
        .unwrap();
    assert_eq!(area, 40.5);
}

#[test]
fn test_to_db_agg_aggregates_per_group() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "plate1/DATA.csv",
        "ImageNumber,val\n1,2\n1,4\n2,10\n",
    );
    write_file(dir.path(), "plate2/DATA.csv", "ImageNumber,val\n1,6\n");

    let files = find_files(dir.path()).unwrap();
    let db = Database::create(dir.path(), "results").unwrap();
    let mut merger = Merger::new(db);

    let merged = merger
        .to_db_agg(
            &files,
            &MergeOptions::default(),
            &AggregateOptions::default(),
        )
        .unwrap();
    assert_eq!(merged, 2);

    let conn = rusqlite::Connection::open(merger.database().path()).unwrap();
    // plate1 reduces to two groups, plate2 to one; files are independent
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM DATA_agg", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);

    let median: f64 = conn
        .query_row(
            "SELECT val FROM DATA_agg WHERE ImageNumber = 1.0 ORDER BY rowid LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(median, 3.0);
}

#[test]
fn test_to_db_agg_with_collapsed_group_key() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "plate1/DATA.csv",
        "Image,Cells\nImageNumber,Area\n1,40.0\n1,44.0\n",
    );

    let files = find_files(dir.path()).unwrap();
    let db = Database::create(dir.path(), "results").unwrap();
    let mut merger = Merger::new(db);

    let options = MergeOptions {
        header_rows: 2,
        ..MergeOptions::default()
    };
    // The group key is the collapsed column name
    let agg = AggregateOptions::with_group_key("Image_ImageNumber");
    merger.to_db_agg(&files, &options, &agg).unwrap();

    let conn = rusqlite::Connection::open(merger.database().path()).unwrap();
    let area: f64 = conn
        .query_row("SELECT Cells_Area FROM DATA_agg", [], |row| row.get(0))
        .unwrap();
    assert_eq!(area, 42.0);
}

#[test]
fn test_no_matching_files_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "plate1/IMAGE.csv", "a\n1\n");

    let files = find_files(dir.path()).unwrap();
    let db = Database::create(dir.path(), "results").unwrap();
    let mut merger = Merger::new(db);

    let result = merger.to_db(&files, &MergeOptions::default());
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

use platemeld::error::Error;
use platemeld::table::{Cell, Header, Table};

#[test]
fn test_table_creation() {
    let table = Table::from_rows(
        vec!["ImageNumber", "val"],
        vec![
            vec![Cell::from(1.0), Cell::from(2.0)],
            vec![Cell::from(2.0), Cell::from(10.0)],
        ],
    )
    .unwrap();

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_count(), 2);
    assert_eq!(
        table.flat_names().unwrap(),
        &["ImageNumber".to_string(), "val".to_string()]
    );
    assert_eq!(table.column_position("val"), Some(1));
    assert_eq!(table.column_by_name("val").unwrap()[1], Cell::Number(10.0));
}

#[test]
fn test_duplicate_flat_names_rejected() {
    let result = Table::new(
        Header::Flat(vec!["a".to_string(), "a".to_string()]),
        vec![vec![Cell::from(1.0)], vec![Cell::from(2.0)]],
    );
    assert!(matches!(result, Err(Error::DuplicateColumnName(name)) if name == "a"));
}

#[test]
fn test_unequal_column_lengths_rejected() {
    let result = Table::new(
        Header::Flat(vec!["a".to_string(), "b".to_string()]),
        vec![vec![Cell::from(1.0), Cell::from(2.0)], vec![Cell::from(3.0)]],
    );
    assert!(matches!(
        result,
        Err(Error::InconsistentRowCount {
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn test_header_arity_must_match_columns() {
    let result = Table::new(
        Header::Flat(vec!["a".to_string()]),
        vec![vec![Cell::from(1.0)], vec![Cell::from(2.0)]],
    );
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_multi_header_uniform_depth_enforced() {
    let result = Table::new(
        Header::Multi(vec![
            vec!["A".to_string(), "x".to_string()],
            vec!["B".to_string(), "x".to_string(), "y".to_string()],
        ]),
        vec![vec![Cell::from(1.0)], vec![Cell::from(2.0)]],
    );
    assert!(matches!(result, Err(Error::HeaderShape(_))));
}

#[test]
fn test_multi_header_needs_two_levels() {
    let result = Table::new(
        Header::Multi(vec![vec!["A".to_string()], vec!["B".to_string()]]),
        vec![vec![Cell::from(1.0)], vec![Cell::from(2.0)]],
    );
    assert!(matches!(result, Err(Error::HeaderShape(_))));
}

#[test]
fn test_missing_column_lookup() {
    let table = Table::from_rows(vec!["a"], vec![vec![Cell::from(1.0)]]).unwrap();
    let result = table.column_by_name("b");
    assert!(matches!(result, Err(Error::ColumnNotFound(name)) if name == "b"));
}

#[test]
fn test_cell_display() {
    assert_eq!(Cell::Number(1.0).to_string(), "1");
    assert_eq!(Cell::Number(1.5).to_string(), "1.5");
    assert_eq!(Cell::Text("B04".to_string()).to_string(), "B04");
    assert_eq!(Cell::Null.to_string(), "NA");
}

#[test]
fn test_cell_as_number() {
    assert_eq!(Cell::Number(2.5).as_number().unwrap(), Some(2.5));
    assert_eq!(Cell::Null.as_number().unwrap(), None);
    assert!(Cell::Text("x".to_string()).as_number().is_err());
}

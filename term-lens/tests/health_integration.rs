use term_lens::analyzers::{compute_health, infer_types, ColumnType};
use term_lens::dataset::{CellValue, Dataset};

fn orders() -> Dataset {
    let mut records: Vec<Vec<CellValue>> = (0..12)
        .map(|i| {
            vec![
                CellValue::from(["north", "south", "east"][i % 3]),
                CellValue::from(format!("{}", 20 + i % 5)),
                CellValue::from(format!("2024-05-{:02}", i + 1)),
            ]
        })
        .collect();
    // far outlier, a missing region, and a repeat of row 0
    records.push(vec!["west".into(), "9000".into(), "2024-05-20".into()]);
    records.push(vec![CellValue::Null, "21".into(), "2024-05-21".into()]);
    records.push(records[0].clone());

    Dataset::from_records(["region", "amount", "ordered"], records).unwrap()
}

#[test]
fn test_health_of_order_table() {
    let data = orders();
    let types = infer_types(&data);
    assert_eq!(types.get("amount"), Some(ColumnType::Numeric));
    assert_eq!(types.get("ordered"), Some(ColumnType::Datetime));

    let health = compute_health(&data, &types);
    assert_eq!(health.duplicate_row_count, 1);

    let region = health.column("region").unwrap();
    assert_eq!(region.missing_count, 1);
    assert_eq!(region.unique_count, 4);
    assert!(region.outlier_row_indices.is_empty());

    let amount = health.column("amount").unwrap();
    assert_eq!(amount.missing_count, 0);
    assert_eq!(amount.outlier_row_indices, vec![12]);
    assert!(amount.outlier_bounds.is_some());

    // dates are never checked for outliers
    let ordered = health.column("ordered").unwrap();
    assert!(ordered.outlier_bounds.is_none());

    assert_eq!(health.total_missing(), 1);
    assert_eq!(health.total_outliers(), 1);
}

#[test]
fn test_columns_reported_in_order() {
    let data = orders();
    let health = compute_health(&data, &infer_types(&data));
    let names: Vec<_> = health.columns.iter().map(|c| c.column.as_str()).collect();
    assert_eq!(names, vec!["region", "amount", "ordered"]);
}

#[test]
fn test_small_numeric_column_has_no_outliers() {
    let data = Dataset::from_records(
        ["v"],
        vec![vec![1.into()], vec![2.into()], vec![10_000.into()]],
    )
    .unwrap();
    let health = compute_health(&data, &infer_types(&data));
    assert_eq!(health.column("v").unwrap().outlier_count(), 0);
}

#[test]
fn test_boundary_value_is_not_outlier() {
    // n = 8: q1 = sorted[2] = 3, q3 = sorted[6] = 7, upper fence = 13
    let records = [1, 2, 3, 4, 5, 6, 7, 13]
        .into_iter()
        .map(|v| vec![CellValue::from(v)])
        .collect();
    let data = Dataset::from_records(["v"], records).unwrap();
    let health = compute_health(&data, &infer_types(&data));
    let v = health.column("v").unwrap();
    assert_eq!(v.outlier_bounds.unwrap().upper, 13.0);
    assert!(v.outlier_row_indices.is_empty());
}

#[test]
fn test_empty_strings_count_as_missing() {
    let data = Dataset::from_records(
        ["a", "b"],
        vec![
            vec!["".into(), "x".into()],
            vec![CellValue::Null, "".into()],
            vec!["y".into(), "x".into()],
        ],
    )
    .unwrap();
    let health = compute_health(&data, &infer_types(&data));
    assert_eq!(health.column("a").unwrap().missing_count, 2);
    assert_eq!(health.column("a").unwrap().unique_count, 1);
    assert_eq!(health.column("b").unwrap().missing_count, 1);
    assert_eq!(health.duplicate_row_count, 0);
}

#[test]
fn test_duplicates_distinguish_number_from_text() {
    let data = Dataset::from_records(
        ["v"],
        vec![vec!["5".into()], vec![5.into()], vec![5.into()]],
    )
    .unwrap();
    let health = compute_health(&data, &infer_types(&data));
    assert_eq!(health.duplicate_row_count, 1);
}

#[test]
fn test_empty_dataset_health() {
    let data = Dataset::from_records(["a"], vec![]).unwrap();
    let health = compute_health(&data, &infer_types(&data));
    assert_eq!(health.duplicate_row_count, 0);
    assert_eq!(health.columns.len(), 1);
    assert_eq!(health.column("a").unwrap().unique_count, 0);
}

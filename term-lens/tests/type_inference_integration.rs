//! Integration tests for TypeInferenceEngine.

use term_lens::analyzers::inference::{
    infer_types, ColumnType, InferenceConfig, TypeInferenceEngine,
};
use term_lens::dataset::{CellValue, Dataset};

fn dataset(columns: &[&str], records: Vec<Vec<CellValue>>) -> Dataset {
    Dataset::from_records(columns.iter().copied(), records).unwrap()
}

fn column(values: &[&str]) -> Dataset {
    dataset(
        &["c"],
        values.iter().map(|v| vec![CellValue::from(*v)]).collect(),
    )
}

#[test]
fn test_mixed_table() {
    let data = dataset(
        &["id", "signup", "plan", "spend"],
        vec![
            vec![1.into(), "2024-01-03".into(), "pro".into(), "19.99".into()],
            vec![2.into(), "2024-01-09".into(), "free".into(), "0".into()],
            vec![3.into(), "2024-02-11".into(), "pro".into(), "19.99".into()],
            vec![4.into(), "".into(), "team".into(), "49".into()],
            vec![5.into(), "2024-03-01".into(), CellValue::Null, "n/a".into()],
        ],
    );

    let types = infer_types(&data);
    assert_eq!(types.get("id"), Some(ColumnType::Numeric));
    assert_eq!(types.get("signup"), Some(ColumnType::Datetime));
    assert_eq!(types.get("plan"), Some(ColumnType::Categorical));
    // 4 of 5 parse: exactly 0.8 is not enough.
    assert_eq!(types.get("spend"), Some(ColumnType::Categorical));

    let order: Vec<_> = types.iter().map(|(c, _)| c.to_string()).collect();
    assert_eq!(order, vec!["id", "signup", "plan", "spend"]);
}

#[test]
fn test_threshold_is_strict() {
    // 5 of 6 numeric = 0.83
    let above = column(&["1", "2", "3", "4", "5", "x"]);
    assert_eq!(infer_types(&above).get("c"), Some(ColumnType::Numeric));

    // 4 of 5 numeric = 0.8
    let at = column(&["1", "2", "3", "4", "x"]);
    assert_eq!(infer_types(&at).get("c"), Some(ColumnType::Categorical));
}

#[test]
fn test_missing_cells_do_not_count() {
    let data = column(&["", "", "", "7", "8"]);
    assert_eq!(infer_types(&data).get("c"), Some(ColumnType::Numeric));
}

#[test]
fn test_years_are_numeric_first() {
    let data = column(&["2019", "2020", "2021"]);
    assert_eq!(infer_types(&data).get("c"), Some(ColumnType::Numeric));
}

#[test]
fn test_wholly_missing_column_is_categorical() {
    let data = dataset(&["a"], vec![vec![CellValue::Null], vec!["".into()]]);
    assert_eq!(infer_types(&data).get("a"), Some(ColumnType::Categorical));
}

#[test]
fn test_empty_dataset_is_categorical() {
    let data = dataset(&["a", "b"], vec![]);
    let types = infer_types(&data);
    assert_eq!(types.len(), 2);
    assert!(types.iter().all(|(_, t)| t == ColumnType::Categorical));
}

#[test]
fn test_column_result_carries_evidence() {
    let data = column(&["2024-01-01", "2024-02-01", "", "soon"]);
    let result = TypeInferenceEngine::new().infer_column_type(&data, "c");

    assert_eq!(result.inferred_type, ColumnType::Categorical);
    assert_eq!(result.samples_analyzed, 3);
    assert_eq!(result.missing_count, 1);
    assert_eq!(result.date_matches, 2);
    assert_eq!(result.numeric_matches, 0);
}

#[test]
fn test_custom_threshold() {
    let data = column(&["1", "2", "3", "x"]);

    let strict = TypeInferenceEngine::new();
    assert_eq!(strict.infer_types(&data).get("c"), Some(ColumnType::Categorical));

    let lenient = TypeInferenceEngine::builder().confidence_threshold(0.5).build();
    assert_eq!(lenient.infer_types(&data).get("c"), Some(ColumnType::Numeric));
}

#[test]
fn test_sample_size_limits_rows() {
    let data = column(&["1", "2", "3", "a", "b", "c", "d"]);
    let engine = TypeInferenceEngine::with_config(InferenceConfig {
        sample_size: Some(3),
        ..InferenceConfig::default()
    });
    assert_eq!(engine.infer_types(&data).get("c"), Some(ColumnType::Numeric));
    assert_eq!(infer_types(&data).get("c"), Some(ColumnType::Categorical));
}

#[test]
fn test_inference_is_idempotent() {
    let data = column(&["1", "x", "2024-01-01", "", "3"]);
    assert_eq!(infer_types(&data), infer_types(&data));
}

#[test]
fn test_types_serialize_in_column_order() {
    let data = dataset(
        &["z", "a"],
        vec![vec![1.into(), "x".into()], vec![2.into(), "y".into()]],
    );
    let json = serde_json::to_string(&infer_types(&data)).unwrap();
    assert_eq!(json, r#"{"z":"numeric","a":"categorical"}"#);
}

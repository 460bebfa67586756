//! End-to-end flows: load, profile, transform, chart, report and remember.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;
use term_lens::chart::{series_color, ChartKind, COLORS};
use term_lens::dataset::{cell, CellValue, Dataset};
use term_lens::formatters::{HumanFormatter, JsonFormatter, MarkdownFormatter};
use term_lens::history::FileHistory;
use term_lens::prelude::*;
use term_lens::sources::{BytesSource, DataSource};

const MONTHLY_CSV: &str = "\
month,region,revenue,costs
Jan,north,100,40
Feb,north,120,45
Mar,south,90,50
Apr,south,110,
May,north,105,42
Jun,south,95,41
Jul,north,130,44
Aug,south,88,39
Sep,north,101,43
Oct,south,99,40
Nov,north,97,38
Dec,south,5000,47
";

async fn monthly() -> Dataset {
    BytesSource::new("monthly.csv", MONTHLY_CSV.as_bytes().to_vec())
        .unwrap()
        .load()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_pipeline_run() {
    let mut pipeline = Pipeline::new();
    pipeline.set_dataset(monthly().await);

    let snapshot = pipeline.run().unwrap();
    assert_eq!(snapshot.types.get("month"), Some(ColumnType::Categorical));
    assert_eq!(snapshot.types.get("revenue"), Some(ColumnType::Numeric));
    assert_eq!(snapshot.rows.len(), 12);

    let revenue = snapshot.health.column("revenue").unwrap();
    assert_eq!(revenue.outlier_row_indices, vec![11]);
    assert_eq!(snapshot.health.column("costs").unwrap().missing_count, 1);

    // default selection: first column on X, second as the only series
    assert_eq!(pipeline.selection().x, "month");
    assert_eq!(pipeline.selection().y, vec!["region"]);
    assert_eq!(pipeline.selection().kind, ChartKind::Line);
}

#[tokio::test]
async fn test_filter_group_and_chart() {
    let mut pipeline = Pipeline::new();
    pipeline.set_dataset(monthly().await);
    pipeline.set_filters(FilterSpec::new().with_range("revenue", None, Some(1_000.0)));
    pipeline.set_aggregation(
        AggregationSpec::new()
            .group_by("region")
            .measure_with("revenue", AggregateFn::Sum)
            .measure_with("costs", AggregateFn::Count),
    );

    let snapshot = pipeline.run().unwrap();
    assert_eq!(snapshot.columns, vec!["region", "revenue", "costs"]);
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(cell(&snapshot.rows[0], "region"), &CellValue::from("north"));
    assert_eq!(cell(&snapshot.rows[0], "revenue"), &CellValue::from(653.0));
    assert_eq!(cell(&snapshot.rows[0], "costs"), &CellValue::from(6.0));
    assert_eq!(cell(&snapshot.rows[1], "revenue"), &CellValue::from(482.0));
    assert_eq!(cell(&snapshot.rows[1], "costs"), &CellValue::from(5.0));

    // health still describes the unfiltered dataset
    assert_eq!(snapshot.health.column("revenue").unwrap().outlier_count(), 1);

    let bars = ChartSelection::for_columns(&snapshot.columns)
        .with_y(["revenue"])
        .with_kind(ChartKind::Bar);
    let projected = snapshot.chart_rows(&bars);
    assert_eq!(projected.len(), 2);
    assert_eq!(projected[1].len(), 2);
    assert_eq!(cell(&projected[1], "region"), &CellValue::from("south"));

    let pie = snapshot.pie_totals(&bars.with_y(["revenue", "costs"]));
    assert_eq!(pie.len(), 2);
    assert_eq!(pie[0].value, 1_135.0);
    assert_eq!(pie[1].value, 11.0);
    assert_eq!(pie[1].color, series_color(1));
    assert_eq!(pie[0].color, COLORS[0]);
}

#[tokio::test]
async fn test_preview_footer() {
    let mut pipeline = Pipeline::with_config(PipelineConfig::default().with_preview_rows(5));
    pipeline.set_dataset(monthly().await);

    let preview = pipeline.run().unwrap().preview();
    assert_eq!(preview.rows.len(), 5);
    assert_eq!(preview.total_rows, 12);
    assert_eq!(preview.footer().as_deref(), Some("Showing first 5 of 12 rows"));
}

#[tokio::test]
async fn test_snapshot_reused_until_state_changes() {
    let mut pipeline = Pipeline::new();
    pipeline.set_dataset(monthly().await);

    let first = pipeline.run().unwrap();
    let again = pipeline.run().unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    pipeline.set_selection(ChartSelection::default().with_x("region"));
    assert!(Arc::ptr_eq(&first, &pipeline.run().unwrap()));

    pipeline.set_filters(FilterSpec::new().with_selection("region", ["south"]));
    let filtered = pipeline.run().unwrap();
    assert!(!Arc::ptr_eq(&first, &filtered));
    assert_eq!(filtered.rows.len(), 6);
}

#[tokio::test]
async fn test_new_dataset_clears_choices() {
    let mut pipeline = Pipeline::new();
    pipeline.set_dataset(monthly().await);
    pipeline.set_filters(FilterSpec::new().with_selection("region", ["north"]));
    pipeline.set_aggregation(AggregationSpec::new().group_by("region").measure("revenue"));

    let other = Dataset::from_records(
        ["city", "temp"],
        vec![vec!["Oslo".into(), "4".into()], vec!["Rome".into(), "18".into()]],
    )
    .unwrap();
    pipeline.set_dataset(other);

    assert!(pipeline.filters().is_empty());
    assert_eq!(pipeline.aggregation().active_group(), None);
    assert_eq!(pipeline.selection().x, "city");

    let snapshot = pipeline.run().unwrap();
    assert_eq!(snapshot.columns, vec!["city", "temp"]);
    assert_eq!(snapshot.rows.len(), 2);

    pipeline.reset();
    assert!(pipeline.run().is_none());
}

#[tokio::test]
async fn test_reports_from_snapshot() {
    let mut pipeline = Pipeline::new();
    pipeline.set_dataset(monthly().await);
    let snapshot = pipeline.run().unwrap();
    let dataset = Arc::clone(pipeline.dataset().unwrap());

    let report = HealthReport::from_snapshot("monthly.csv", &dataset, &snapshot);
    assert_eq!(report.row_count, 12);
    assert_eq!(report.total_outliers, 1);

    let human = HumanFormatter::with_config(FormatterConfig::default().with_colors(false))
        .format(&report)
        .unwrap();
    assert!(human.contains("monthly.csv"));
    assert!(human.contains("revenue"));

    let json = JsonFormatter::new().format(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["row_count"], 12);
    assert_eq!(parsed["total_missing"], 1);

    let markdown = MarkdownFormatter::new().format(&report).unwrap();
    assert!(markdown.contains("| Column | Type | Missing | Unique | Outliers |"));
}

#[tokio::test]
async fn test_history_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("history.json");
    let dataset = monthly().await;
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

    let mut history = FileHistory::load(&path, 3).await.unwrap();
    assert!(history.is_empty());
    for i in 0..4 {
        history.add_at(format!("file{i}.csv"), &dataset, now - Duration::hours(4 - i));
    }
    assert_eq!(history.len(), 3);
    history.save(&path).await.unwrap();

    let restored = FileHistory::load(&path, 3).await.unwrap();
    let names: Vec<_> = restored.entries().map(|e| e.file_name.clone()).collect();
    assert_eq!(names, vec!["file3.csv", "file2.csv", "file1.csv"]);

    let newest = restored.entries().next().unwrap();
    assert_eq!(newest.age_label(now), "1 hour ago");
    assert_eq!(newest.to_dataset().unwrap(), dataset);

    let smaller = FileHistory::load(&path, 1).await.unwrap();
    assert_eq!(smaller.len(), 1);
}

//! term-lens command line
//!
//! Loads a dataset from a path or URL and prints its health summary, optionally
//! followed by filtered, grouped, or chart-ready rows.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use term_lens::chart::ChartKind;
use term_lens::formatters::{
    FormatterConfig, HealthFormatter, HealthReport, HumanFormatter, JsonFormatter,
    MarkdownFormatter,
};
use term_lens::history::FileHistory;
use term_lens::logging::setup::{init_logging, LoggingConfig};
use term_lens::pipeline::{Pipeline, PipelineConfig};
use term_lens::prelude::*;
use term_lens::sources;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Markdown,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File path or http(s) URL of a CSV, JSON, XLSX or XLS dataset
    location: String,

    /// Health summary format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Keep rows where COLUMN is within MIN..MAX (either side may be empty)
    #[arg(long = "range", value_name = "COLUMN=MIN..MAX")]
    ranges: Vec<String>,

    /// Keep rows where COLUMN is one of the listed values
    #[arg(long = "select", value_name = "COLUMN=V1,V2")]
    selections: Vec<String>,

    /// Group rows by this column
    #[arg(long)]
    group_by: Option<String>,

    /// Measure column to aggregate, with an optional function (sum, avg, count)
    #[arg(long = "measure", value_name = "COLUMN[:FN]")]
    measures: Vec<String>,

    /// Print chart-ready rows of this kind after the summary (line, bar, pie)
    #[arg(long, value_name = "KIND", value_parser = parse_chart_kind)]
    chart: Option<ChartKind>,

    /// X axis column (default: first column)
    #[arg(long)]
    x: Option<String>,

    /// Y series column, repeatable (default: second column)
    #[arg(long)]
    y: Vec<String>,

    /// Print the first rows of the result
    #[arg(long)]
    preview: bool,

    /// List outlier row indices in the summary
    #[arg(long)]
    outlier_rows: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Record the load in this history file
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logging = if args.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default()
    };
    if let Err(e) = init_logging(logging.with_json_format(args.json_logs)) {
        eprintln!("{e}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = PipelineConfig::default().with_log(if args.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    });

    let filters = parse_filters(&args.ranges, &args.selections)?;
    let aggregation = parse_aggregation(args.group_by.as_deref(), &args.measures)?;

    let source = sources::open(&args.location)?;
    let dataset = source.load().await?;
    let file_name = source.file_name();

    if let Some(path) = &args.history {
        let mut history = FileHistory::load(path, config.history_capacity).await?;
        history.add(file_name.clone(), &dataset);
        history.save(path).await?;
    }

    let mut pipeline = Pipeline::with_config(config);
    pipeline.set_dataset(dataset);
    pipeline.set_filters(filters);
    pipeline.set_aggregation(aggregation);

    let snapshot = pipeline
        .run()
        .ok_or_else(|| LensError::Internal("Pipeline has no dataset".to_string()))?;
    let dataset = pipeline
        .dataset()
        .ok_or_else(|| LensError::Internal("Pipeline has no dataset".to_string()))?;

    let formatter_config = FormatterConfig::default()
        .with_colors(!args.no_color)
        .with_outlier_rows(args.outlier_rows);
    let report = HealthReport::from_snapshot(&file_name, dataset, &snapshot);
    let summary = match args.output {
        OutputFormat::Human => HumanFormatter::with_config(formatter_config).format(&report)?,
        OutputFormat::Json => JsonFormatter::with_config(formatter_config).format(&report)?,
        OutputFormat::Markdown => {
            MarkdownFormatter::with_config(formatter_config).format(&report)?
        }
    };
    println!("{summary}");

    if args.preview {
        let preview = snapshot.preview();
        println!("{}", serde_json::to_string_pretty(&preview.rows)?);
        if let Some(footer) = preview.footer() {
            println!("{footer}");
        }
    }

    if let Some(kind) = args.chart {
        let mut selection = ChartSelection::for_columns(&snapshot.columns).with_kind(kind);
        if let Some(x) = args.x {
            selection = selection.with_x(x);
        }
        if !args.y.is_empty() {
            selection = selection.with_y(args.y);
        }

        let chart = match selection.kind {
            ChartKind::Pie => serde_json::to_string_pretty(&snapshot.pie_totals(&selection))?,
            ChartKind::Line | ChartKind::Bar => {
                serde_json::to_string_pretty(&snapshot.chart_rows(&selection))?
            }
        };
        println!("{chart}");
    }

    Ok(())
}

fn parse_chart_kind(value: &str) -> Result<ChartKind> {
    value.parse()
}

fn parse_filters(ranges: &[String], selections: &[String]) -> Result<FilterSpec> {
    let mut spec = FilterSpec::new();

    for range in ranges {
        let (column, bounds) = split_assignment(range)?;
        let (min, max) = bounds.split_once("..").ok_or_else(|| {
            LensError::Configuration(format!("Range '{range}' must look like COLUMN=MIN..MAX"))
        })?;
        spec.set(column, ColumnFilter::range(parse_bound(min)?, parse_bound(max)?));
    }

    for selection in selections {
        let (column, values) = split_assignment(selection)?;
        spec.set(column, ColumnFilter::selected(values.split(',').map(str::trim)));
    }

    Ok(spec)
}

fn parse_aggregation(group_by: Option<&str>, measures: &[String]) -> Result<AggregationSpec> {
    let mut spec = AggregationSpec::new();
    if let Some(column) = group_by {
        spec = spec.group_by(column);
    }
    for measure in measures {
        spec = match measure.split_once(':') {
            Some((column, function)) => spec.measure_with(column, function.parse::<AggregateFn>()?),
            None => spec.measure(measure.as_str()),
        };
    }
    Ok(spec)
}

fn split_assignment(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .filter(|(column, _)| !column.is_empty())
        .ok_or_else(|| LensError::Configuration(format!("Expected COLUMN=VALUE, got '{arg}'")))
}

fn parse_bound(bound: &str) -> Result<Option<f64>> {
    let bound = bound.trim();
    if bound.is_empty() {
        return Ok(None);
    }
    bound
        .parse::<f64>()
        .map(Some)
        .map_err(|e| LensError::Configuration(format!("Invalid bound '{bound}': {e}")))
}

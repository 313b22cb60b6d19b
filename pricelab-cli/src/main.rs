//! PriceLab CLI — clean market data files and run indicator pipelines.
//!
//! Commands:
//! - `clean` — clean a CSV/Parquet price file and write the result as CSV
//! - `analyze` — clean a price file and apply the indicators of a TOML pipeline
//! - `fundamentals` — clean a JSON fundamental record
//! - `statement` — clean a financial statement CSV

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pricelab_core::cleaning::{CleanerConfig, CleaningReport, DataCleaner, TracingObserver};
use pricelab_core::data::{write_csv, DataIngestor, DEFAULT_INDEX_COLUMN};
use pricelab_core::pipeline::{Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "pricelab",
    about = "PriceLab CLI — market data cleaning and technical indicators"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a price file (CSV or Parquet) and write the cleaned table as CSV.
    Clean {
        /// Input price file.
        input: PathBuf,

        /// Output CSV path.
        #[arg(long, short)]
        output: PathBuf,

        /// Cleaner settings from a TOML file. Flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Missing-value policy: forward, backward, interpolate or drop.
        #[arg(long)]
        fill_method: Option<String>,

        /// Remove rows whose price z-score exceeds the threshold.
        #[arg(long, default_value_t = false)]
        remove_outliers: bool,

        /// Z-score threshold for outlier removal.
        #[arg(long)]
        outlier_threshold: Option<f64>,

        /// Keep OHLC rows even when high/low bounds are violated.
        #[arg(long, default_value_t = false)]
        skip_ohlc_validation: bool,

        /// Keep column names as they appear in the file.
        #[arg(long, default_value_t = false)]
        keep_column_names: bool,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        report_json: bool,

        /// Symbol used to label the report.
        #[arg(long)]
        symbol: Option<String>,

        /// Name of the index column in the input file.
        #[arg(long, default_value = DEFAULT_INDEX_COLUMN)]
        index_column: String,
    },
    /// Clean a price file and apply the indicators listed in a TOML pipeline.
    Analyze {
        /// Input price file.
        input: PathBuf,

        /// Pipeline TOML (`[cleaner]` plus `[[indicators]]`).
        #[arg(long)]
        pipeline: PathBuf,

        /// Output CSV path.
        #[arg(long, short)]
        output: PathBuf,

        /// Symbol used to label the report.
        #[arg(long)]
        symbol: Option<String>,

        /// Name of the index column in the input file.
        #[arg(long, default_value = DEFAULT_INDEX_COLUMN)]
        index_column: String,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        report_json: bool,
    },
    /// Clean a JSON fundamental record and print it.
    Fundamentals {
        /// JSON file holding one object of metric name → value.
        input: PathBuf,

        /// Keep metric names as they appear in the file.
        #[arg(long, default_value_t = false)]
        keep_column_names: bool,

        /// Print the record and its report as one JSON object.
        #[arg(long, default_value_t = false)]
        report_json: bool,
    },
    /// Clean a financial statement CSV (line items down, periods across).
    Statement {
        /// Input statement CSV.
        input: PathBuf,

        /// Statement kind: income, balance or cashflow.
        #[arg(long)]
        kind: String,

        /// Write the cleaned statement as JSON here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Keep line-item labels as they appear in the file.
        #[arg(long, default_value_t = false)]
        keep_column_names: bool,

        /// Print the report as JSON. Without `--output` the statement and
        /// report share one JSON object.
        #[arg(long, default_value_t = false)]
        report_json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input,
            output,
            config,
            fill_method,
            remove_outliers,
            outlier_threshold,
            skip_ohlc_validation,
            keep_column_names,
            report_json,
            symbol,
            index_column,
        } => {
            let mut cleaner_config = match config {
                Some(path) => CleanerConfig::from_file(&path)?,
                None => CleanerConfig::default(),
            };
            if let Some(method) = fill_method {
                cleaner_config.fill_method = method.parse()?;
            }
            if remove_outliers {
                cleaner_config.remove_outliers = true;
            }
            if let Some(threshold) = outlier_threshold {
                cleaner_config.outlier_threshold = threshold;
            }
            if skip_ohlc_validation {
                cleaner_config.validate_ohlc = false;
            }
            if keep_column_names {
                cleaner_config.normalize_column_names = false;
            }
            run_clean(
                &input,
                &output,
                cleaner_config,
                symbol.as_deref(),
                &index_column,
                report_json,
            )
        }
        Commands::Analyze {
            input,
            pipeline,
            output,
            symbol,
            index_column,
            report_json,
        } => run_analyze(
            &input,
            &pipeline,
            &output,
            symbol.as_deref(),
            &index_column,
            report_json,
        ),
        Commands::Fundamentals {
            input,
            keep_column_names,
            report_json,
        } => run_fundamentals(&input, keep_column_names, report_json),
        Commands::Statement {
            input,
            kind,
            output,
            keep_column_names,
            report_json,
        } => run_statement(&input, &kind, output.as_deref(), keep_column_names, report_json),
    }
}

fn build_cleaner(config: CleanerConfig) -> Result<DataCleaner> {
    Ok(DataCleaner::new(config)?.with_observer(Arc::new(TracingObserver)))
}

fn print_report(report: &CleaningReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

/// One JSON document holding a cleaned result under `key` and its report
/// under `report`, so stdout stays parseable.
fn with_report(
    key: &str,
    result: serde_json::Value,
    report: &CleaningReport,
) -> Result<serde_json::Value> {
    let mut document = serde_json::Map::new();
    document.insert(key.to_string(), result);
    document.insert("report".to_string(), serde_json::to_value(report)?);
    Ok(serde_json::Value::Object(document))
}

/// Print a cleaned result to stdout followed by its report. With
/// `report_json` both go out as a single JSON object.
fn print_result(
    key: &str,
    result: serde_json::Value,
    report: &CleaningReport,
    report_json: bool,
) -> Result<()> {
    if report_json {
        println!("{}", serde_json::to_string_pretty(&with_report(key, result, report)?)?);
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    print_report(report, false)
}

fn run_clean(
    input: &Path,
    output: &Path,
    config: CleanerConfig,
    symbol: Option<&str>,
    index_column: &str,
    report_json: bool,
) -> Result<()> {
    let cleaner = build_cleaner(config)?;
    let raw = DataIngestor::new()
        .with_index_column(index_column)
        .read_prices(input)?;

    let (cleaned, report) = cleaner.clean_price_series(&raw, symbol)?;
    if cleaned.is_empty() {
        bail!(
            "no rows left after cleaning {} ({} rows removed)",
            input.display(),
            report.rows_removed()
        );
    }

    write_csv(&cleaned, output, index_column)?;
    print_report(&report, report_json)?;
    if !report_json {
        println!("Cleaned data written to: {}", output.display());
    }
    Ok(())
}

fn run_analyze(
    input: &Path,
    pipeline_path: &Path,
    output: &Path,
    symbol: Option<&str>,
    index_column: &str,
    report_json: bool,
) -> Result<()> {
    let config = PipelineConfig::from_file(pipeline_path)?;
    if config.indicators.is_empty() {
        bail!(
            "pipeline {} lists no indicators; use `pricelab clean` instead",
            pipeline_path.display()
        );
    }
    let pipeline = Pipeline::from_config(&config)?.with_observer(Arc::new(TracingObserver));
    let raw = DataIngestor::new()
        .with_index_column(index_column)
        .read_prices(input)?;

    let result = pipeline.run(&raw, symbol)?;
    write_csv(&result.table, output, index_column)?;

    print_report(&result.report, report_json)?;
    if !report_json {
        println!("Indicators: {}", result.indicators.join(", "));
        println!("Output written to: {}", output.display());
    }
    Ok(())
}

fn run_fundamentals(input: &Path, keep_column_names: bool, report_json: bool) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;

    let cleaner = build_cleaner(CleanerConfig {
        normalize_column_names: !keep_column_names,
        ..CleanerConfig::default()
    })?;
    let (record, report) = cleaner.clean_fundamental_json(&document)?;

    print_result("record", serde_json::to_value(&record)?, &report, report_json)
}

fn run_statement(
    input: &Path,
    kind: &str,
    output: Option<&Path>,
    keep_column_names: bool,
    report_json: bool,
) -> Result<()> {
    let cleaner = build_cleaner(CleanerConfig {
        normalize_column_names: !keep_column_names,
        ..CleanerConfig::default()
    })?;
    let raw = DataIngestor::new().read_statement(input)?;
    let (statement, report) = cleaner.clean_financial_statement_named(&raw, kind)?;

    match output {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(&statement)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if !report_json {
                println!("Cleaned statement written to: {}", path.display());
            }
            print_report(&report, report_json)
        }
        None => print_result("statement", serde_json::to_value(&statement)?, &report, report_json),
    }
}

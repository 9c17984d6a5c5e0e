//! CLI entry point for the TLC trip statistics tool.
//!
//! Provides subcommands for downloading a month of yellow-taxi trips, computing
//! the trip reports from a local CSV, and doing both in one go.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tlc_trip_stats::{
    archive::{DEFAULT_ARCHIVE_URL, download_month, parse_month},
    diagnostics::{RejectFileSink, TracingSink},
    fetch::BasicClient,
    output::{print_json, write_reports},
    pipeline::run,
    reader::TripReader,
    rules::ValidationRules,
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "tlc_trip_stats")]
#[command(about = "Trip distance, airport amount and passenger reports for NYC yellow taxi data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ProcessArgs {
    /// Directory the three report CSVs are written to
    #[arg(short, long, default_value = "reports")]
    output_dir: PathBuf,

    /// JSON file overriding the validation thresholds
    #[arg(long)]
    rules: Option<String>,

    /// CSV file receiving every skipped or rejected row
    #[arg(long)]
    rejects: Option<String>,

    /// Also write tolerated defaults to the rejects file
    #[arg(long, default_value_t = false, requires = "rejects")]
    with_notices: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download one month of trips and convert it to CSV
    Fetch {
        /// Month of data in YYYY-MM format
        #[arg(value_name = "YYYY-MM")]
        month: String,

        /// Directory the CSV is saved to
        #[arg(short, long, default_value = "data")]
        output_dir: PathBuf,
    },
    /// Compute the reports from a trip CSV (optionally gzip-compressed)
    Process {
        /// Path to the trip CSV
        #[arg(value_name = "FILE")]
        input: String,

        #[command(flatten)]
        args: ProcessArgs,
    },
    /// Download one month of trips and compute its reports
    Run {
        /// Month of data in YYYY-MM format
        #[arg(value_name = "YYYY-MM")]
        month: String,

        /// Directory the downloaded CSV is saved to
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        #[command(flatten)]
        args: ProcessArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/tlc_trip_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("tlc_trip_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { month, output_dir } => {
            fetch(&month, &output_dir).await?;
        }
        Commands::Process { input, args } => {
            process(&input, &args)?;
        }
        Commands::Run {
            month,
            data_dir,
            args,
        } => {
            let csv_path = fetch(&month, &data_dir).await?;
            process(&csv_path.to_string_lossy(), &args)?;
        }
    }

    info!("Processing complete");
    Ok(())
}

/// Downloads a month of trips from the archive named by `TLC_ARCHIVE_URL`.
async fn fetch(month: &str, output_dir: &Path) -> Result<PathBuf> {
    let month = parse_month(month)?;
    let base_url =
        std::env::var("TLC_ARCHIVE_URL").unwrap_or_else(|_| DEFAULT_ARCHIVE_URL.to_string());
    let client = BasicClient::new();

    download_month(&client, &base_url, month, output_dir).await
}

/// Runs the report engine over one trip CSV and writes the reports.
#[tracing::instrument(skip(args), fields(output_dir = %args.output_dir.display()))]
fn process(input: &str, args: &ProcessArgs) -> Result<()> {
    let rules = match &args.rules {
        Some(path) => ValidationRules::load(path)?,
        None => ValidationRules::default(),
    };
    info!(
        max_trip_distance = rules.max_trip_distance,
        min_trip_duration_secs = rules.min_trip_duration_secs,
        "Validation rules"
    );

    let reader = TripReader::open(input).with_context(|| format!("cannot read {input}"))?;

    let output = match &args.rejects {
        Some(path) => {
            let rejects = RejectFileSink::create(path)?.with_notices(args.with_notices);
            let mut sink = (TracingSink, rejects);
            let output = run(reader, &rules, &mut sink)?;
            let (written, _) = sink.1.finish()?;
            info!(path = %path, written, "Rejected rows saved");
            output
        }
        None => run(reader, &rules, &mut TracingSink)?,
    };

    if output.stats.rows_read == 0 {
        warn!(input, "Trip source contained no rows");
    }
    info!(
        validated_pct = output.stats.validated_pct(),
        "Distance report coverage"
    );
    print_json(&output.stats)?;

    write_reports(&args.output_dir, &output.reports)?;
    Ok(())
}

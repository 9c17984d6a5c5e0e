//! Retrieval of monthly yellow-taxi trip files from the TLC archive.
//!
//! The archive publishes one parquet file per month; it is converted to the CSV
//! layout the trip reader consumes.

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::fetch::{HttpClient, fetch_bytes};
use crate::model::TIMESTAMP_FORMAT;

pub const DEFAULT_ARCHIVE_URL: &str = "https://d37ci6vzurychx.cloudfront.net/trip-data";

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month(NaiveDate);

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

/// Parses a `YYYY-MM` month.
pub fn parse_month(s: &str) -> Result<Month> {
    let s = s.trim();
    let shaped = s.len() == 7
        && s.as_bytes()[4] == b'-'
        && s.bytes().enumerate().all(|(i, b)| i == 4 || b.is_ascii_digit());
    if !shaped {
        bail!("invalid month '{s}', expected YYYY-MM");
    }
    let first = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .with_context(|| format!("invalid month '{s}', expected YYYY-MM"))?;
    Ok(Month(first))
}

pub fn source_file_name(month: Month) -> String {
    format!("yellow_tripdata_{month}.parquet")
}

pub fn csv_file_name(month: Month) -> String {
    format!("yellow_tripdata_{month}.csv")
}

pub fn monthly_url(base: &str, month: Month) -> String {
    format!("{}/{}", base.trim_end_matches('/'), source_file_name(month))
}

fn format_timestamp(ts: Option<DateTime<chrono::Utc>>) -> String {
    ts.map(|dt| dt.naive_utc().format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Renders one parquet value as a CSV cell.
pub fn field_to_csv(field: &Field) -> String {
    match field {
        Field::Null => String::new(),
        Field::Str(s) => s.clone(),
        Field::Float(v) => v.to_string(),
        Field::Double(v) => v.to_string(),
        Field::TimestampMicros(us) => format_timestamp(DateTime::from_timestamp_micros(*us)),
        Field::TimestampMillis(ms) => format_timestamp(DateTime::from_timestamp_millis(*ms)),
        other => other.to_string(),
    }
}

/// Converts a parquet trip file to CSV, returning the number of data rows written.
pub fn parquet_to_csv<W: Write>(data: Bytes, writer: W) -> Result<usize> {
    let reader = SerializedFileReader::new(data).context("not a parquet file")?;
    let header: Vec<String> = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    debug!(
        columns = header.len(),
        rows = reader.metadata().file_metadata().num_rows(),
        "Converting parquet"
    );

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&header)?;

    let mut rows = 0;
    for row in reader.get_row_iter(None)? {
        let row = row?;
        out.write_record(row.get_column_iter().map(|(_, field)| field_to_csv(field)))?;
        rows += 1;
    }
    out.flush()?;

    Ok(rows)
}

/// Downloads one month of trips into `out_dir` as CSV and returns the file path.
#[tracing::instrument(skip(client, month), fields(month = %month))]
pub async fn download_month<C: HttpClient>(
    client: &C,
    base_url: &str,
    month: Month,
    out_dir: &Path,
) -> Result<PathBuf> {
    let url = monthly_url(base_url, month);
    info!(url = %url, "Downloading monthly trip file");

    let data = fetch_bytes(client, &url)
        .await
        .with_context(|| format!("failed to download {url}"))?;
    debug!(bytes = data.len(), "Trip file received");

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = out_dir.join(csv_file_name(month));
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;

    let rows = parquet_to_csv(Bytes::from(data), BufWriter::new(file))
        .with_context(|| format!("failed to convert {url}"))?;

    info!(path = %path.display(), rows, "Data saved");
    Ok(path)
}

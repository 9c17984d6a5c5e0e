//! Persistence of report tables and run statistics.
//!
//! Each table is written as CSV with its fixed header, even when it has no rows.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::report::{
    AIRPORT_AMOUNTS_HEADER, AMOUNTS_BY_AIRPORTS, AVG_PASSENGER_COUNT, PASSENGER_AVERAGE_HEADER,
    Reports, TRIP_DISTANCE_HEADER, TRIP_DISTANCE_SUMMARY,
};
use crate::stats::RunStats;

/// Writes a header row followed by `rows` as CSV.
pub fn write_table<W: Write, T: Serialize>(writer: W, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

fn write_table_file<T: Serialize>(
    dir: &Path,
    name: &str,
    header: &[&str],
    rows: &[T],
) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.csv"));
    if rows.is_empty() {
        warn!(table = name, "No rows to write, emitting header only");
    }
    debug!(path = %path.display(), rows = rows.len(), "Writing report table");

    let file = fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_table(file, header, rows).with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), rows = rows.len(), "Report saved");
    Ok(path)
}

/// Writes the three report tables into `dir`, creating it if needed.
pub fn write_reports(dir: &Path, reports: &Reports) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    Ok(vec![
        write_table_file(
            dir,
            TRIP_DISTANCE_SUMMARY,
            &TRIP_DISTANCE_HEADER,
            &reports.trip_distance_summary,
        )?,
        write_table_file(
            dir,
            AMOUNTS_BY_AIRPORTS,
            &AIRPORT_AMOUNTS_HEADER,
            &reports.amounts_by_airports,
        )?,
        write_table_file(
            dir,
            AVG_PASSENGER_COUNT,
            &PASSENGER_AVERAGE_HEADER,
            &reports.avg_passenger_count,
        )?,
    ])
}

/// Logs run statistics as pretty-printed JSON.
pub fn print_json(stats: &RunStats) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

//! Single-pass fold of a row stream into the three reports.

use tracing::info;

use crate::aggregators::{RowOutcome, RowReport, TripAccumulators};
use crate::diagnostics::{DiagnosticEvent, DiagnosticSink, EventKind};
use crate::errors::SourceError;
use crate::model::RawRow;
use crate::report::Reports;
use crate::rules::ValidationRules;
use crate::stats::RunStats;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub reports: Reports,
    pub stats: RunStats,
}

/// Runs every row through the engine, reporting diagnostics to `sink`.
///
/// Unreadable records are skipped and recorded. The run stops only on a fatal
/// [`SourceError`] from the row source.
pub fn run<I, D>(rows: I, rules: &ValidationRules, sink: &mut D) -> Result<RunOutput, SourceError>
where
    I: IntoIterator<Item = Result<RawRow, SourceError>>,
    D: DiagnosticSink + ?Sized,
{
    let mut accumulators = TripAccumulators::new();
    let mut stats = RunStats::default();

    for item in rows {
        let row = match item {
            Ok(row) => row,
            Err(SourceError::Record(e)) => {
                sink.record(&DiagnosticEvent {
                    row_number: e.row_number(),
                    kind: EventKind::Skipped(&e),
                    raw: None,
                });
                stats.record_unreadable(&e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let report = accumulators.ingest(&row, rules);
        emit(sink, &row, &report);
        stats.record(&report);
    }

    let reports = accumulators.into_reports();
    info!(
        rows_read = stats.rows_read,
        rows_validated = stats.rows_validated,
        rows_rejected = stats.rows_rejected,
        rows_skipped = stats.rows_skipped,
        distance_rows = reports.trip_distance_summary.len(),
        airport_rows = reports.amounts_by_airports.len(),
        passenger_rows = reports.avg_passenger_count.len(),
        "Trip stream exhausted"
    );

    Ok(RunOutput { reports, stats })
}

fn emit<D: DiagnosticSink + ?Sized>(sink: &mut D, row: &RawRow, report: &RowReport) {
    for notice in &report.notices {
        sink.record(&DiagnosticEvent {
            row_number: row.row_number,
            kind: EventKind::Notice(notice),
            raw: Some(row),
        });
    }

    let kind = match &report.outcome {
        RowOutcome::Validated(_) => return,
        RowOutcome::Rejected(r) => EventKind::Rejected(r),
        RowOutcome::Skipped(e) => EventKind::Skipped(e),
    };
    sink.record(&DiagnosticEvent {
        row_number: row.row_number,
        kind,
        raw: Some(row),
    });
}

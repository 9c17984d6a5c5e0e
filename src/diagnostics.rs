//! Per-row diagnostic events and the sinks that receive them.
//!
//! The engine never logs on its own; every skipped row, rejected trip and
//! tolerated default is handed to a [`DiagnosticSink`] together with the raw
//! field values so it can be inspected later.

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use tracing::{debug, trace, warn};

use crate::errors::RowError;
use crate::model::RawRow;
use crate::normalize::Notice;
use crate::validate::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Row dropped from every report.
    Skip,
    /// Row dropped from the distance report.
    Reject,
    /// Row kept with a defaulted field.
    Notice,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Skip => "skip",
            Severity::Reject => "reject",
            Severity::Notice => "notice",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind<'a> {
    Skipped(&'a RowError),
    Rejected(&'a Rejection),
    Notice(&'a Notice),
}

impl EventKind<'_> {
    pub fn severity(&self) -> Severity {
        match self {
            EventKind::Skipped(_) => Severity::Skip,
            EventKind::Rejected(_) => Severity::Reject,
            EventKind::Notice(_) => Severity::Notice,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            EventKind::Skipped(e) => e.code(),
            EventKind::Rejected(r) => r.code(),
            EventKind::Notice(n) => n.code(),
        }
    }

    pub fn detail(&self) -> String {
        match self {
            EventKind::Skipped(e) => e.to_string(),
            EventKind::Rejected(r) => r.to_string(),
            EventKind::Notice(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent<'a> {
    pub row_number: usize,
    pub kind: EventKind<'a>,
    /// `None` when the record could not be decoded at all.
    pub raw: Option<&'a RawRow>,
}

/// Receives diagnostic events for later inspection.
pub trait DiagnosticSink {
    fn record(&mut self, event: &DiagnosticEvent<'_>);
}

impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for (A, B) {
    fn record(&mut self, event: &DiagnosticEvent<'_>) {
        self.0.record(event);
        self.1.record(event);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn record(&mut self, event: &DiagnosticEvent<'_>) {
        (**self).record(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, event: &DiagnosticEvent<'_>) {
        let row = event.row_number;
        let code = event.kind.code();
        match &event.kind {
            EventKind::Skipped(e) => warn!(row, code, error = %e, "Row skipped"),
            EventKind::Rejected(r) => debug!(row, code, reason = %r, "Trip rejected"),
            EventKind::Notice(n) => trace!(row, code, column = n.column, "Value defaulted"),
        }
    }
}

/// An owned copy of a diagnostic event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub row_number: usize,
    pub severity: Severity,
    pub code: &'static str,
    pub detail: String,
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<RecordedEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter().filter(move |e| e.severity == severity)
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&mut self, event: &DiagnosticEvent<'_>) {
        self.events.push(RecordedEvent {
            row_number: event.row_number,
            severity: event.kind.severity(),
            code: event.kind.code(),
            detail: event.kind.detail(),
        });
    }
}

#[derive(Serialize)]
struct RejectRecord {
    row_number: usize,
    severity: Severity,
    code: &'static str,
    detail: String,
    raw: String,
}

/// Writes skipped and rejected rows, with their raw fields as JSON, to a CSV file.
///
/// Notices are not written unless enabled with [`RejectFileSink::with_notices`].
/// Write failures are held back until [`RejectFileSink::finish`].
pub struct RejectFileSink<W: Write> {
    writer: Writer<W>,
    include_notices: bool,
    written: usize,
    error: Option<anyhow::Error>,
}

impl RejectFileSink<File> {
    pub fn create(path: &str) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> RejectFileSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: Writer::from_writer(writer),
            include_notices: false,
            written: 0,
            error: None,
        }
    }

    pub fn with_notices(mut self, include: bool) -> Self {
        self.include_notices = include;
        self
    }

    fn write(&mut self, event: &DiagnosticEvent<'_>) -> Result<()> {
        // Sorted keys keep the file stable between runs.
        let raw = match event.raw {
            Some(row) => serde_json::to_string(&row.fields.iter().collect::<BTreeMap<_, _>>())?,
            None => String::new(),
        };
        self.writer.serialize(RejectRecord {
            row_number: event.row_number,
            severity: event.kind.severity(),
            code: event.kind.code(),
            detail: event.kind.detail(),
            raw,
        })?;
        self.written += 1;
        Ok(())
    }

    /// Flushes the file and returns the number of events written.
    pub fn finish(mut self) -> Result<(usize, W)> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        let inner = self
            .writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush reject file: {}", e.error()))?;
        Ok((self.written, inner))
    }
}

impl<W: Write> DiagnosticSink for RejectFileSink<W> {
    fn record(&mut self, event: &DiagnosticEvent<'_>) {
        if self.error.is_some() {
            return;
        }
        if !self.include_notices && event.kind.severity() == Severity::Notice {
            return;
        }
        if let Err(e) = self.write(event) {
            self.error = Some(e);
        }
    }
}

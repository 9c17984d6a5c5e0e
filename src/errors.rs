use thiserror::Error;

/// A row that cannot be normalized. The row is skipped from every report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("row {row_number}: {column} is not a number: {value:?}")]
    MalformedNumericField {
        row_number: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row_number}: {column} is not a timestamp: {value:?}")]
    MalformedTimestamp {
        row_number: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row_number}: unreadable record: {message}")]
    UnreadableRecord { row_number: usize, message: String },
}

impl RowError {
    pub fn row_number(&self) -> usize {
        match self {
            RowError::MalformedNumericField { row_number, .. }
            | RowError::MalformedTimestamp { row_number, .. }
            | RowError::UnreadableRecord { row_number, .. } => *row_number,
        }
    }

    /// Stable reason code used in diagnostics and run statistics.
    pub fn code(&self) -> &'static str {
        match self {
            RowError::MalformedNumericField { .. } => "malformed_numeric_field",
            RowError::MalformedTimestamp { .. } => "malformed_timestamp",
            RowError::UnreadableRecord { .. } => "unreadable_record",
        }
    }
}

/// Failures of the trip source itself.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open trip source {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("trip source header is unreadable: {source}")]
    Header {
        #[source]
        source: csv::Error,
    },

    #[error("trip source header is missing required columns: {missing:?}")]
    MissingColumns { missing: Vec<&'static str> },

    #[error("trip source read failed after row {row_number}: {source}")]
    Io {
        row_number: usize,
        #[source]
        source: csv::Error,
    },

    /// A single record could not be decoded; the stream itself is still usable.
    #[error(transparent)]
    Record(#[from] RowError),
}

impl SourceError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SourceError::Record(_))
    }
}

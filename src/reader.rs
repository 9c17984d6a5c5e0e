//! CSV trip source.
//!
//! The header is checked for [`REQUIRED_COLUMNS`] when the reader is created,
//! before any row is yielded. Rows are read one at a time and only the
//! required columns are copied into each [`RawRow`].

use csv::{ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::errors::{RowError, SourceError};
use crate::model::{REQUIRED_COLUMNS, RawRow};

pub struct TripReader<R: Read> {
    reader: csv::Reader<R>,
    columns: Vec<(usize, &'static str)>,
    record: StringRecord,
    row_number: usize,
}

impl TripReader<Box<dyn Read>> {
    /// Opens a CSV file, decompressing it when the name ends in `.gz`.
    pub fn open(path: &str) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_string(),
            source,
        })?;
        let gzipped = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
        debug!(path, gzipped, "Opening trip source");

        let inner: Box<dyn Read> = if gzipped {
            Box::new(MultiGzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Self::from_reader(inner)
    }
}

impl<R: Read> TripReader<R> {
    pub fn from_reader(inner: R) -> Result<Self, SourceError> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(inner);
        let headers = reader
            .headers()
            .map_err(|source| SourceError::Header { source })?
            .clone();

        let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        let mut missing = Vec::new();
        for column in REQUIRED_COLUMNS {
            match headers.iter().position(|h| h.trim() == column) {
                Some(idx) => columns.push((idx, column)),
                None => missing.push(column),
            }
        }
        if !missing.is_empty() {
            return Err(SourceError::MissingColumns { missing });
        }

        Ok(Self {
            reader,
            columns,
            record: StringRecord::new(),
            row_number: 0,
        })
    }
}

impl<R: Read> Iterator for TripReader<R> {
    type Item = Result<RawRow, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                self.row_number += 1;
                let mut row = RawRow::new(self.row_number);
                for (idx, column) in &self.columns {
                    if let Some(value) = self.record.get(*idx) {
                        row.fields.insert((*column).to_string(), value.to_string());
                    }
                }
                Some(Ok(row))
            }
            Err(source) if source.is_io_error() => Some(Err(SourceError::Io {
                row_number: self.row_number,
                source,
            })),
            Err(e) => {
                self.row_number += 1;
                Some(Err(SourceError::Record(RowError::UnreadableRecord {
                    row_number: self.row_number,
                    message: e.to_string(),
                })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PASSENGER_COUNT, TRIP_DISTANCE};

    const HEADER: &str = "VendorID,tpep_pickup_datetime,tpep_dropoff_datetime,passenger_count,trip_distance,RatecodeID,PULocationID,tip_amount,tolls_amount,total_amount";

    #[test]
    fn test_reads_required_columns() {
        let data = format!(
            "{HEADER}\n2,2024-02-01 00:04:45,2024-02-01 00:19:58,1.0,4.39,1.0,68,0.0,0.0,26.0\n"
        );
        let mut reader = TripReader::from_reader(data.as_bytes()).unwrap();

        let row = reader.next().unwrap().unwrap();
        assert_eq!(row.row_number, 1);
        assert_eq!(row.get(TRIP_DISTANCE), Some("4.39"));
        assert_eq!(row.get(PASSENGER_COUNT), Some("1.0"));
        assert_eq!(row.get("VendorID"), None);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_missing_columns_fail_before_rows() {
        let data = "trip_distance,tpep_pickup_datetime\n1.0,2024-02-01 00:04:45\n";
        match TripReader::from_reader(data.as_bytes()) {
            Err(SourceError::MissingColumns { missing }) => {
                assert!(missing.contains(&"RatecodeID"));
                assert!(missing.contains(&"PULocationID"));
                assert!(!missing.contains(&"trip_distance"));
            }
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("expected missing column error"),
        }
    }

    #[test]
    fn test_short_record_is_recoverable() {
        let data = format!(
            "{HEADER}\n2,2024-02-01 00:04:45\n2,2024-02-01 00:04:45,2024-02-01 00:19:58,1,4.39,1,68,0,0,26\n"
        );
        let mut reader = TripReader::from_reader(data.as_bytes()).unwrap();

        let first = reader.next().unwrap().unwrap_err();
        assert!(!first.is_fatal());
        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.row_number, 2);
        assert_eq!(reader.row_number, 2);
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(matches!(
            TripReader::open("/nonexistent/yellow_tripdata.csv"),
            Err(SourceError::Open { .. })
        ));
    }
}

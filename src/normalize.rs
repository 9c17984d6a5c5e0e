//! Coercion of loosely-typed trip columns into a [`NormalizedTrip`].
//!
//! Two parsing policies apply:
//!
//! * strict fields (distance, money, timestamps) fail the whole row with a [`RowError`];
//! * tolerant fields (rate code, passenger count) never fail and degrade to `0`,
//!   reported through a [`Notice`] when the value was absent or unusable.

use chrono::NaiveDateTime;
use std::fmt;

use crate::errors::RowError;
use crate::model::{
    DROPOFF_DATETIME, LocationId, NormalizedTrip, PASSENGER_COUNT, PICKUP_DATETIME,
    PU_LOCATION_ID, RATE_CODE_ID, RawRow, TIMESTAMP_FORMAT, TIP_AMOUNT, TOLLS_AMOUNT,
    TOTAL_AMOUNT, TRIP_DISTANCE,
};

/// Why a tolerant field fell back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    Missing,
    Unparseable,
}

/// Outcome of parsing a tolerant integer field.
#[derive(Debug, Clone, PartialEq)]
pub enum Tolerant<T> {
    Exact(T),
    /// A float value truncated toward zero, e.g. `"2.0"` or `"2.7"` to `2`.
    Truncated(T),
    Defaulted {
        value: T,
        reason: DefaultReason,
    },
}

impl<T: Copy> Tolerant<T> {
    pub fn value(&self) -> T {
        match self {
            Tolerant::Exact(v) | Tolerant::Truncated(v) => *v,
            Tolerant::Defaulted { value, .. } => *value,
        }
    }
}

/// A tolerated default, surfaced for diagnostics only.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub row_number: usize,
    pub column: &'static str,
    pub reason: DefaultReason,
    pub raw: Option<String>,
}

impl Notice {
    pub fn code(&self) -> &'static str {
        match self.reason {
            DefaultReason::Missing => "missing_value_defaulted",
            DefaultReason::Unparseable => "unparseable_value_defaulted",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, &self.raw) {
            (DefaultReason::Unparseable, Some(raw)) => {
                write!(f, "{} {:?} is not numeric, using 0", self.column, raw)
            }
            _ => write!(f, "{} is empty", self.column),
        }
    }
}

/// A successfully normalized trip with any notices raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub trip: NormalizedTrip,
    pub notices: Vec<Notice>,
}

/// Parses an integer column that tolerates floats and blanks.
pub fn parse_tolerant_int(raw: Option<&str>) -> Tolerant<i32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Tolerant::Defaulted {
            value: 0,
            reason: DefaultReason::Missing,
        };
    };

    if let Ok(v) = raw.parse::<i32>() {
        return Tolerant::Exact(v);
    }

    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= i32::MIN as f64 && f <= i32::MAX as f64 => {
            Tolerant::Truncated(f.trunc() as i32)
        }
        _ => Tolerant::Defaulted {
            value: 0,
            reason: DefaultReason::Unparseable,
        },
    }
}

/// Parses a required float column. Blank, unparseable and non-finite values fail.
pub fn parse_strict_float(
    row_number: usize,
    column: &'static str,
    raw: Option<&str>,
) -> Result<f64, RowError> {
    let value = raw.unwrap_or_default();
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RowError::MalformedNumericField {
            row_number,
            column,
            value: value.to_string(),
        }),
    }
}

/// Parses a required timestamp column in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(
    row_number: usize,
    column: &'static str,
    raw: Option<&str>,
) -> Result<NaiveDateTime, RowError> {
    let value = raw.unwrap_or_default();
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        RowError::MalformedTimestamp {
            row_number,
            column,
            value: value.to_string(),
        }
    })
}

/// Normalizes one raw row.
///
/// # Errors
///
/// Returns [`RowError::MalformedNumericField`] or [`RowError::MalformedTimestamp`]
/// when a strict column cannot be parsed.
pub fn normalize(row: &RawRow) -> Result<Normalized, RowError> {
    let n = row.row_number;

    let trip_distance = parse_strict_float(n, TRIP_DISTANCE, row.get(TRIP_DISTANCE))?;
    let pickup_time = parse_timestamp(n, PICKUP_DATETIME, row.get(PICKUP_DATETIME))?;
    let dropoff_time = parse_timestamp(n, DROPOFF_DATETIME, row.get(DROPOFF_DATETIME))?;
    let total_amount = parse_strict_float(n, TOTAL_AMOUNT, row.get(TOTAL_AMOUNT))?;
    let tip_amount = parse_strict_float(n, TIP_AMOUNT, row.get(TIP_AMOUNT))?;
    let tolls_amount = parse_strict_float(n, TOLLS_AMOUNT, row.get(TOLLS_AMOUNT))?;

    let mut notices = Vec::new();

    let mut tolerant = |column: &'static str| {
        let raw = row.get(column);
        let parsed = parse_tolerant_int(raw);
        if let Tolerant::Defaulted { reason, .. } = parsed {
            notices.push(Notice {
                row_number: n,
                column,
                reason,
                raw: raw.map(str::to_string),
            });
        }
        parsed.value()
    };

    let rate_code = tolerant(RATE_CODE_ID);
    let passenger_count = tolerant(PASSENGER_COUNT);

    let pickup_location_id = row.get(PU_LOCATION_ID).and_then(LocationId::parse);
    if pickup_location_id.is_none() {
        notices.push(Notice {
            row_number: n,
            column: PU_LOCATION_ID,
            reason: DefaultReason::Missing,
            raw: row.get(PU_LOCATION_ID).map(str::to_string),
        });
    }

    Ok(Normalized {
        trip: NormalizedTrip {
            row_number: n,
            trip_distance,
            pickup_time,
            dropoff_time,
            rate_code,
            total_amount,
            tip_amount,
            tolls_amount,
            passenger_count,
            pickup_location_id,
        },
        notices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> RawRow {
        RawRow::new(1)
            .with(TRIP_DISTANCE, "3.4")
            .with(PICKUP_DATETIME, "2024-02-01 08:15:00")
            .with(DROPOFF_DATETIME, "2024-02-01 08:40:30")
            .with(RATE_CODE_ID, "1.0")
            .with(TOTAL_AMOUNT, "23.10")
            .with(TIP_AMOUNT, "4.00")
            .with(TOLLS_AMOUNT, "0")
            .with(PASSENGER_COUNT, "2.0")
            .with(PU_LOCATION_ID, "161")
    }

    #[test]
    fn test_tolerant_int_policy() {
        assert_eq!(parse_tolerant_int(Some("2")), Tolerant::Exact(2));
        assert_eq!(parse_tolerant_int(Some("2.0")), Tolerant::Truncated(2));
        assert_eq!(parse_tolerant_int(Some("2.9")), Tolerant::Truncated(2));
        assert_eq!(parse_tolerant_int(Some("-1.5")), Tolerant::Truncated(-1));
        assert_eq!(
            parse_tolerant_int(Some("")),
            Tolerant::Defaulted {
                value: 0,
                reason: DefaultReason::Missing
            }
        );
        assert_eq!(
            parse_tolerant_int(None),
            Tolerant::Defaulted {
                value: 0,
                reason: DefaultReason::Missing
            }
        );
        assert_eq!(
            parse_tolerant_int(Some("two")),
            Tolerant::Defaulted {
                value: 0,
                reason: DefaultReason::Unparseable
            }
        );
        assert_eq!(
            parse_tolerant_int(Some("NaN")),
            Tolerant::Defaulted {
                value: 0,
                reason: DefaultReason::Unparseable
            }
        );
    }

    #[test]
    fn test_strict_float_rejects_text_and_nan() {
        assert_eq!(parse_strict_float(1, TRIP_DISTANCE, Some(" 1.25 ")), Ok(1.25));
        assert!(parse_strict_float(1, TRIP_DISTANCE, Some("N/A")).is_err());
        assert!(parse_strict_float(1, TRIP_DISTANCE, Some("nan")).is_err());
        assert!(parse_strict_float(1, TRIP_DISTANCE, Some("")).is_err());
        assert!(parse_strict_float(1, TRIP_DISTANCE, None).is_err());
    }

    #[test]
    fn test_normalize_full_row() {
        let normalized = normalize(&sample_row()).unwrap();
        let trip = normalized.trip;

        assert!(normalized.notices.is_empty());
        assert_eq!(trip.trip_distance, 3.4);
        assert_eq!(trip.rate_code, 1);
        assert_eq!(trip.passenger_count, 2);
        assert_eq!(trip.total_amount, 23.10);
        assert_eq!(trip.pickup_location_id, Some(LocationId::Zone(161)));
        assert_eq!(
            trip.pickup_date(),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_normalize_empty_tolerant_fields_default_to_zero() {
        let row = sample_row()
            .with(PASSENGER_COUNT, "")
            .with(RATE_CODE_ID, "");
        let normalized = normalize(&row).unwrap();

        assert_eq!(normalized.trip.passenger_count, 0);
        assert_eq!(normalized.trip.rate_code, 0);
        assert_eq!(normalized.notices.len(), 2);
        assert!(
            normalized
                .notices
                .iter()
                .all(|n| n.reason == DefaultReason::Missing)
        );
    }

    #[test]
    fn test_normalize_unparseable_tolerant_field_raises_notice() {
        let row = sample_row().with(PASSENGER_COUNT, "many");
        let normalized = normalize(&row).unwrap();

        assert_eq!(normalized.trip.passenger_count, 0);
        assert_eq!(normalized.notices.len(), 1);
        let notice = &normalized.notices[0];
        assert_eq!(notice.column, PASSENGER_COUNT);
        assert_eq!(notice.reason, DefaultReason::Unparseable);
        assert_eq!(notice.raw.as_deref(), Some("many"));
        assert_eq!(notice.code(), "unparseable_value_defaulted");
    }

    #[test]
    fn test_normalize_malformed_distance_fails() {
        let row = sample_row().with(TRIP_DISTANCE, "N/A");
        let err = normalize(&row).unwrap_err();

        assert_eq!(
            err,
            RowError::MalformedNumericField {
                row_number: 1,
                column: TRIP_DISTANCE,
                value: "N/A".to_string()
            }
        );
    }

    #[test]
    fn test_normalize_malformed_timestamp_fails() {
        let row = sample_row().with(DROPOFF_DATETIME, "01/02/2024 08:40");
        let err = normalize(&row).unwrap_err();

        assert!(matches!(
            err,
            RowError::MalformedTimestamp {
                column: DROPOFF_DATETIME,
                ..
            }
        ));
    }

    #[test]
    fn test_normalize_missing_location_is_a_notice() {
        let row = sample_row().with(PU_LOCATION_ID, "");
        let normalized = normalize(&row).unwrap();

        assert_eq!(normalized.trip.pickup_location_id, None);
        assert_eq!(normalized.notices[0].column, PU_LOCATION_ID);
    }
}

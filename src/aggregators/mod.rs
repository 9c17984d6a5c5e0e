//! Streaming accumulators behind the three trip reports.
//!
//! [`TripAccumulators`] owns one accumulator per report for the lifetime of a
//! run. Each row is folded in exactly once through [`TripAccumulators::ingest`];
//! nothing about the raw row is retained afterwards.

pub mod airport;
pub mod distance;
pub mod passenger;

pub use airport::{AirportAccumulator, AirportTotals};
pub use distance::{DistanceAccumulator, DistanceExtremes, DistanceKey};
pub use passenger::{PassengerAccumulator, PassengerKey, PassengerTally};

use crate::errors::RowError;
use crate::model::{RawRow, TimeOfDay};
use crate::normalize::{Notice, normalize};
use crate::report::{Reports, build_reports};
use crate::rules::ValidationRules;
use crate::validate::{Rejection, validate};

/// What happened to a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Counted in every report.
    Validated(TimeOfDay),
    /// Counted in the airport and passenger reports only.
    Rejected(Rejection),
    /// Counted nowhere.
    Skipped(RowError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    pub outcome: RowOutcome,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Default)]
pub struct TripAccumulators {
    pub distance: DistanceAccumulator,
    pub airport: AirportAccumulator,
    pub passenger: PassengerAccumulator,
}

impl TripAccumulators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes, validates and folds one row into the accumulators.
    pub fn ingest(&mut self, row: &RawRow, rules: &ValidationRules) -> RowReport {
        let normalized = match normalize(row) {
            Ok(n) => n,
            Err(e) => {
                return RowReport {
                    outcome: RowOutcome::Skipped(e),
                    notices: Vec::new(),
                };
            }
        };
        let trip = &normalized.trip;
        let date = trip.pickup_date();

        self.airport.update_for_rate_code(
            trip.rate_code,
            trip.total_amount,
            trip.tip_amount,
            trip.tolls_amount,
        );

        if let Some(location) = &trip.pickup_location_id {
            self.passenger
                .update((date, location.clone()), trip.passenger_count);
        }

        let outcome = match validate(trip, rules) {
            Ok(valid) => {
                self.distance
                    .update((date, valid.time_of_day), trip.trip_distance);
                RowOutcome::Validated(valid.time_of_day)
            }
            Err(rejection) => RowOutcome::Rejected(rejection),
        };

        RowReport {
            outcome,
            notices: normalized.notices,
        }
    }

    pub fn into_reports(self) -> Reports {
        build_reports(self.distance, self.airport, self.passenger)
    }
}

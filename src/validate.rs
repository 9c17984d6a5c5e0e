//! Distance report validation.
//!
//! Only the distance report applies these checks; the airport and passenger
//! reports consume every normalized trip.

use thiserror::Error;

use crate::model::{NormalizedTrip, TimeOfDay, ValidatedTrip};
use crate::rules::ValidationRules;

/// Why a trip was excluded from the distance report.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Rejection {
    #[error("trip distance {distance} is not positive")]
    NonPositiveDistance { distance: f64 },

    #[error("trip distance {distance} exceeds {ceiling}")]
    DistanceAboveCeiling { distance: f64, ceiling: f64 },

    #[error("dropoff is not after pickup")]
    NonPositiveDuration,

    #[error("trip lasted {seconds}s, below the {minimum}s minimum")]
    ShortDuration { seconds: i64, minimum: i64 },

    #[error("total amount {total} is negative")]
    NegativeTotal { total: f64 },
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NonPositiveDistance { .. } => "non_positive_distance",
            Rejection::DistanceAboveCeiling { .. } => "distance_above_ceiling",
            Rejection::NonPositiveDuration => "non_positive_duration",
            Rejection::ShortDuration { .. } => "short_duration",
            Rejection::NegativeTotal { .. } => "negative_total",
        }
    }
}

/// Checks a trip against `rules` and buckets its pickup hour.
pub fn validate<'a>(
    trip: &'a NormalizedTrip,
    rules: &ValidationRules,
) -> Result<ValidatedTrip<'a>, Rejection> {
    let distance = trip.trip_distance;
    if distance <= 0.0 {
        return Err(Rejection::NonPositiveDistance { distance });
    }
    if distance > rules.max_trip_distance {
        return Err(Rejection::DistanceAboveCeiling {
            distance,
            ceiling: rules.max_trip_distance,
        });
    }

    let duration = trip.dropoff_time - trip.pickup_time;
    if trip.dropoff_time <= trip.pickup_time {
        return Err(Rejection::NonPositiveDuration);
    }
    if duration < rules.min_trip_duration() {
        return Err(Rejection::ShortDuration {
            seconds: duration.num_seconds(),
            minimum: rules.min_trip_duration_secs,
        });
    }

    if trip.total_amount < 0.0 {
        return Err(Rejection::NegativeTotal {
            total: trip.total_amount,
        });
    }

    Ok(ValidatedTrip {
        trip,
        time_of_day: TimeOfDay::of(&trip.pickup_time),
    })
}

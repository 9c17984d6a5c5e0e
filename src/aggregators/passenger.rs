use chrono::NaiveDate;
use std::collections::HashMap;

use crate::model::LocationId;

pub type PassengerKey = (NaiveDate, LocationId);

/// Passenger sum and trip count for one key.
///
/// The average is derived on demand so it never accumulates rounding drift.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassengerTally {
    pub passengers: i64,
    pub trips: u64,
}

impl PassengerTally {
    pub fn average(&self) -> f64 {
        if self.trips == 0 {
            0.0
        } else {
            self.passengers as f64 / self.trips as f64
        }
    }
}

/// Running passenger tallies per pickup date and pickup location.
#[derive(Debug, Default)]
pub struct PassengerAccumulator {
    tallies: HashMap<PassengerKey, PassengerTally>,
}

impl PassengerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, key: PassengerKey, passenger_count: i32) {
        let t = self.tallies.entry(key).or_default();
        t.passengers += i64::from(passenger_count);
        t.trips += 1;
    }

    pub fn get(&self, key: &PassengerKey) -> Option<&PassengerTally> {
        self.tallies.get(key)
    }

    pub fn into_entries(self) -> impl Iterator<Item = (PassengerKey, PassengerTally)> {
        self.tallies.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_is_sum_over_count() {
        let mut acc = PassengerAccumulator::new();
        let key = (
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            LocationId::Zone(132),
        );
        for p in [1, 2, 2, 0, 1, 1] {
            acc.update(key.clone(), p);
        }

        let tally = acc.get(&key).unwrap();
        assert_eq!(tally.passengers, 7);
        assert_eq!(tally.trips, 6);
        assert_eq!(tally.average(), 7.0 / 6.0);
    }

    #[test]
    fn test_empty_tally_average_is_zero() {
        assert_eq!(PassengerTally::default().average(), 0.0);
    }
}

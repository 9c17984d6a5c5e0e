//! Flattening of accumulator state into the three ordered report tables.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregators::{AirportAccumulator, DistanceAccumulator, PassengerAccumulator};
use crate::model::{AirportCategory, LocationId, TimeOfDay};

pub const TRIP_DISTANCE_SUMMARY: &str = "trip_distance_summary";
pub const AMOUNTS_BY_AIRPORTS: &str = "amounts_by_airports";
pub const AVG_PASSENGER_COUNT: &str = "avg_passenger_count";

pub const TRIP_DISTANCE_HEADER: [&str; 4] =
    ["Date", "Time of Day", "Shortest Distance", "Longest Distance"];
pub const AIRPORT_AMOUNTS_HEADER: [&str; 4] =
    ["Category", "Total Amount", "Tip Amount", "Tolls Amount"];
pub const PASSENGER_AVERAGE_HEADER: [&str; 3] =
    ["Date", "Pickup Location ID", "Average Passenger Count"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDistanceRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Time of Day")]
    pub time_of_day: TimeOfDay,
    #[serde(rename = "Shortest Distance")]
    pub shortest_distance: f64,
    #[serde(rename = "Longest Distance")]
    pub longest_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportAmountsRow {
    #[serde(rename = "Category")]
    pub category: AirportCategory,
    #[serde(rename = "Total Amount")]
    pub total_amount: f64,
    #[serde(rename = "Tip Amount")]
    pub tip_amount: f64,
    #[serde(rename = "Tolls Amount")]
    pub tolls_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassengerAverageRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Pickup Location ID")]
    pub pickup_location_id: LocationId,
    #[serde(rename = "Average Passenger Count")]
    pub average_passenger_count: f64,
}

/// The three finished tables of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reports {
    pub trip_distance_summary: Vec<TripDistanceRow>,
    pub amounts_by_airports: Vec<AirportAmountsRow>,
    pub avg_passenger_count: Vec<PassengerAverageRow>,
}

/// Builds the report tables, consuming the accumulators.
///
/// * distance rows are ordered by date, then MORNING, AFTERNOON, EVENING, NIGHT;
/// * airport rows follow JFK, Newark, Nassau/WC and omit categories without trips;
/// * passenger rows are ordered by date, then pickup location id.
pub fn build_reports(
    distance: DistanceAccumulator,
    airport: AirportAccumulator,
    passenger: PassengerAccumulator,
) -> Reports {
    let mut trip_distance_summary: Vec<TripDistanceRow> = distance
        .into_entries()
        .map(|((date, time_of_day), e)| TripDistanceRow {
            date,
            time_of_day,
            shortest_distance: e.shortest,
            longest_distance: e.longest,
        })
        .collect();
    trip_distance_summary.sort_by_key(|r| (r.date, r.time_of_day));

    let mut amounts_by_airports: Vec<AirportAmountsRow> = airport
        .into_entries()
        .filter(|(_, t)| t.trips > 0)
        .map(|(category, t)| AirportAmountsRow {
            category,
            total_amount: t.total_amount,
            tip_amount: t.tip_amount,
            tolls_amount: t.tolls_amount,
        })
        .collect();
    amounts_by_airports.sort_by_key(|r| r.category);

    let mut avg_passenger_count: Vec<PassengerAverageRow> = passenger
        .into_entries()
        .filter(|(_, t)| t.trips > 0)
        .map(|((date, pickup_location_id), t)| PassengerAverageRow {
            date,
            pickup_location_id,
            average_passenger_count: t.average(),
        })
        .collect();
    avg_passenger_count.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.pickup_location_id.cmp(&b.pickup_location_id))
    });

    Reports {
        trip_distance_summary,
        amounts_by_airports,
        avg_passenger_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feb(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn test_distance_rows_sorted_by_date_then_bucket() {
        let mut distance = DistanceAccumulator::new();
        distance.update((feb(2), TimeOfDay::Morning), 1.0);
        distance.update((feb(1), TimeOfDay::Night), 2.0);
        distance.update((feb(1), TimeOfDay::Morning), 1.2);
        distance.update((feb(1), TimeOfDay::Morning), 15.5);
        distance.update((feb(1), TimeOfDay::Evening), 3.0);

        let reports = build_reports(
            distance,
            AirportAccumulator::new(),
            PassengerAccumulator::new(),
        );
        let keys: Vec<_> = reports
            .trip_distance_summary
            .iter()
            .map(|r| (r.date, r.time_of_day))
            .collect();

        assert_eq!(
            keys,
            vec![
                (feb(1), TimeOfDay::Morning),
                (feb(1), TimeOfDay::Evening),
                (feb(1), TimeOfDay::Night),
                (feb(2), TimeOfDay::Morning),
            ]
        );
        assert_eq!(
            reports.trip_distance_summary[0],
            TripDistanceRow {
                date: feb(1),
                time_of_day: TimeOfDay::Morning,
                shortest_distance: 1.2,
                longest_distance: 15.5,
            }
        );
    }

    #[test]
    fn test_airport_rows_in_fixed_order_without_empty_categories() {
        let mut airport = AirportAccumulator::new();
        airport.update(AirportCategory::NassauWestchester, 80.0, 0.0, 0.0);
        airport.update(AirportCategory::Jfk, 50.25, 10.0, 5.0);
        airport.update(AirportCategory::Jfk, 20.0, 0.0, 0.0);

        let reports = build_reports(
            DistanceAccumulator::new(),
            airport,
            PassengerAccumulator::new(),
        );
        let categories: Vec<_> = reports
            .amounts_by_airports
            .iter()
            .map(|r| r.category)
            .collect();

        assert_eq!(
            categories,
            vec![AirportCategory::Jfk, AirportCategory::NassauWestchester]
        );
        let jfk = &reports.amounts_by_airports[0];
        assert_eq!(
            (jfk.total_amount, jfk.tip_amount, jfk.tolls_amount),
            (70.25, 10.0, 5.0)
        );
    }

    #[test]
    fn test_passenger_rows_sorted_by_date_then_location() {
        let mut passenger = PassengerAccumulator::new();
        passenger.update((feb(2), LocationId::Zone(4)), 1);
        passenger.update((feb(1), LocationId::Zone(132)), 3);
        passenger.update((feb(1), LocationId::Zone(48)), 2);
        passenger.update((feb(1), LocationId::Zone(48)), 1);

        let reports = build_reports(
            DistanceAccumulator::new(),
            AirportAccumulator::new(),
            passenger,
        );
        let rows = &reports.avg_passenger_count;

        assert_eq!(rows.len(), 3);
        assert_eq!(
            (rows[0].date, &rows[0].pickup_location_id),
            (feb(1), &LocationId::Zone(48))
        );
        assert_eq!(rows[0].average_passenger_count, 1.5);
        assert_eq!(rows[1].pickup_location_id, LocationId::Zone(132));
        assert_eq!(rows[2].date, feb(2));
    }

    #[test]
    fn test_empty_accumulators_give_empty_tables() {
        let reports = build_reports(
            DistanceAccumulator::new(),
            AirportAccumulator::new(),
            PassengerAccumulator::new(),
        );
        assert_eq!(reports, Reports::default());
    }
}

//! Trip record types shared by the normalizer, validator and accumulators.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Timestamp layout used by the monthly trip files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const TRIP_DISTANCE: &str = "trip_distance";
pub const PICKUP_DATETIME: &str = "tpep_pickup_datetime";
pub const DROPOFF_DATETIME: &str = "tpep_dropoff_datetime";
pub const RATE_CODE_ID: &str = "RatecodeID";
pub const TOTAL_AMOUNT: &str = "total_amount";
pub const TIP_AMOUNT: &str = "tip_amount";
pub const TOLLS_AMOUNT: &str = "tolls_amount";
pub const PASSENGER_COUNT: &str = "passenger_count";
pub const PU_LOCATION_ID: &str = "PULocationID";

/// Columns every trip source must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    TRIP_DISTANCE,
    PICKUP_DATETIME,
    DROPOFF_DATETIME,
    RATE_CODE_ID,
    TOTAL_AMOUNT,
    TIP_AMOUNT,
    TOLLS_AMOUNT,
    PASSENGER_COUNT,
    PU_LOCATION_ID,
];

/// A trip row as received, keyed by column name.
///
/// `row_number` is 1-based and excludes the header line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            fields: HashMap::new(),
        }
    }

    /// Sets a column value, replacing any previous one.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.fields.insert(column.to_string(), value.to_string());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// Pickup zone identifier.
///
/// Zone ids are numeric in the published data; anything else is kept verbatim
/// and sorts after every numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum LocationId {
    Zone(u32),
    Other(String),
}

impl LocationId {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<u32>() {
            Ok(id) => Some(LocationId::Zone(id)),
            Err(_) => Some(LocationId::Other(raw.to_string())),
        }
    }
}

impl Ord for LocationId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (LocationId::Zone(a), LocationId::Zone(b)) => a.cmp(b),
            (LocationId::Zone(_), LocationId::Other(_)) => Ordering::Less,
            (LocationId::Other(_), LocationId::Zone(_)) => Ordering::Greater,
            (LocationId::Other(a), LocationId::Other(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for LocationId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationId::Zone(id) => write!(f, "{id}"),
            LocationId::Other(id) => f.write_str(id),
        }
    }
}

/// Typed view of a [`RawRow`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTrip {
    pub row_number: usize,
    pub trip_distance: f64,
    pub pickup_time: NaiveDateTime,
    pub dropoff_time: NaiveDateTime,
    pub rate_code: i32,
    pub total_amount: f64,
    pub tip_amount: f64,
    pub tolls_amount: f64,
    pub passenger_count: i32,
    pub pickup_location_id: Option<LocationId>,
}

impl NormalizedTrip {
    pub fn pickup_date(&self) -> NaiveDate {
        self.pickup_time.date()
    }
}

/// Pickup time-of-day bucket. Variant order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// | Hours        | Bucket    |
    /// |--------------|-----------|
    /// | 05 – 11      | MORNING   |
    /// | 12 – 16      | AFTERNOON |
    /// | 17 – 20      | EVENING   |
    /// | 21 – 04      | NIGHT     |
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn of(time: &NaiveDateTime) -> Self {
        Self::from_hour(time.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "MORNING",
            TimeOfDay::Afternoon => "AFTERNOON",
            TimeOfDay::Evening => "EVENING",
            TimeOfDay::Night => "NIGHT",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trip that passed the distance report checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedTrip<'a> {
    pub trip: &'a NormalizedTrip,
    pub time_of_day: TimeOfDay,
}

/// Airport destination derived from the rate code. Variant order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AirportCategory {
    #[serde(rename = "JFK")]
    Jfk,
    #[serde(rename = "Newark")]
    Newark,
    #[serde(rename = "Nassau/WC")]
    NassauWestchester,
}

impl AirportCategory {
    /// Maps rate codes 2, 3 and 4; every other code has no category.
    pub fn from_rate_code(rate_code: i32) -> Option<Self> {
        match rate_code {
            2 => Some(AirportCategory::Jfk),
            3 => Some(AirportCategory::Newark),
            4 => Some(AirportCategory::NassauWestchester),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AirportCategory::Jfk => "JFK",
            AirportCategory::Newark => "Newark",
            AirportCategory::NassauWestchester => "Nassau/WC",
        }
    }
}

impl fmt::Display for AirportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Night);
    }

    #[test]
    fn test_time_of_day_report_order() {
        let mut buckets = vec![
            TimeOfDay::Night,
            TimeOfDay::Evening,
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
        ];
        buckets.sort();
        assert_eq!(
            buckets,
            vec![
                TimeOfDay::Morning,
                TimeOfDay::Afternoon,
                TimeOfDay::Evening,
                TimeOfDay::Night
            ]
        );
    }

    #[test]
    fn test_airport_category_from_rate_code() {
        assert_eq!(AirportCategory::from_rate_code(2), Some(AirportCategory::Jfk));
        assert_eq!(AirportCategory::from_rate_code(3), Some(AirportCategory::Newark));
        assert_eq!(
            AirportCategory::from_rate_code(4),
            Some(AirportCategory::NassauWestchester)
        );
        for code in [0, 1, 5, 6, 99, -2] {
            assert_eq!(AirportCategory::from_rate_code(code), None);
        }
    }

    #[test]
    fn test_location_id_ordering() {
        let mut ids = vec![
            LocationId::parse("abc").unwrap(),
            LocationId::parse("132").unwrap(),
            LocationId::parse("7").unwrap(),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                LocationId::Zone(7),
                LocationId::Zone(132),
                LocationId::Other("abc".to_string())
            ]
        );
        assert_eq!(LocationId::parse("   "), None);
    }

    #[test]
    fn test_raw_row_get() {
        let row = RawRow::new(3).with(TRIP_DISTANCE, "1.5");
        assert_eq!(row.get(TRIP_DISTANCE), Some("1.5"));
        assert_eq!(row.get(TIP_AMOUNT), None);
        assert_eq!(row.row_number, 3);
    }
}

use std::collections::HashMap;

use crate::model::AirportCategory;

/// Summed amounts for one airport category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirportTotals {
    pub total_amount: f64,
    pub tip_amount: f64,
    pub tolls_amount: f64,
    pub trips: u64,
}

/// Running amount totals per airport category.
#[derive(Debug, Default)]
pub struct AirportAccumulator {
    totals: HashMap<AirportCategory, AirportTotals>,
}

impl AirportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, category: AirportCategory, total: f64, tip: f64, tolls: f64) {
        let t = self.totals.entry(category).or_default();
        t.total_amount += total;
        t.tip_amount += tip;
        t.tolls_amount += tolls;
        t.trips += 1;
    }

    /// Adds the trip if `rate_code` maps to an airport. Returns the category used.
    pub fn update_for_rate_code(
        &mut self,
        rate_code: i32,
        total: f64,
        tip: f64,
        tolls: f64,
    ) -> Option<AirportCategory> {
        let category = AirportCategory::from_rate_code(rate_code)?;
        self.update(category, total, tip, tolls);
        Some(category)
    }

    pub fn get(&self, category: AirportCategory) -> Option<&AirportTotals> {
        self.totals.get(&category)
    }

    pub fn into_entries(self) -> impl Iterator<Item = (AirportCategory, AirportTotals)> {
        self.totals.into_iter()
    }
}

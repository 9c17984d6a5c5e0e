use chrono::NaiveDate;
use std::collections::HashMap;

use crate::model::TimeOfDay;

pub type DistanceKey = (NaiveDate, TimeOfDay);

/// Shortest and longest distance seen for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceExtremes {
    pub shortest: f64,
    pub longest: f64,
}

/// Running distance extremes per pickup date and time of day.
#[derive(Debug, Default)]
pub struct DistanceAccumulator {
    extremes: HashMap<DistanceKey, DistanceExtremes>,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, key: DistanceKey, distance: f64) {
        self.extremes
            .entry(key)
            .and_modify(|e| {
                if distance < e.shortest {
                    e.shortest = distance;
                }
                if distance > e.longest {
                    e.longest = distance;
                }
            })
            .or_insert(DistanceExtremes {
                shortest: distance,
                longest: distance,
            });
    }

    pub fn get(&self, key: &DistanceKey) -> Option<&DistanceExtremes> {
        self.extremes.get(key)
    }

    pub fn len(&self) -> usize {
        self.extremes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extremes.is_empty()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (DistanceKey, DistanceExtremes)> {
        self.extremes.into_iter()
    }
}

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Thresholds applied by the distance report validator.
///
/// Loaded from a JSON file; omitted keys keep their defaults:
/// ```json
/// {
///   "max_trip_distance": 150.0,
///   "min_trip_duration_secs": 90
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationRules {
    /// Trips longer than this many miles are treated as meter errors.
    pub max_trip_distance: f64,
    /// Trips shorter than this are treated as meter errors.
    pub min_trip_duration_secs: i64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_trip_distance: 200.0,
            min_trip_duration_secs: 60,
        }
    }
}

impl ValidationRules {
    /// Loads rules from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read validation rules from '{path}'"))?;
        let rules: Self = serde_json::from_str(&content)
            .with_context(|| format!("invalid validation rules in '{path}'"))?;
        rules
            .check()
            .with_context(|| format!("invalid validation rules in '{path}'"))?;
        Ok(rules)
    }

    /// Fails when a threshold cannot be applied to trip timestamps.
    pub fn check(&self) -> Result<()> {
        if self.max_trip_distance.is_nan() {
            bail!("max_trip_distance must be a number");
        }
        if TimeDelta::try_seconds(self.min_trip_duration_secs).is_none() {
            bail!(
                "min_trip_duration_secs {} is out of range",
                self.min_trip_duration_secs
            );
        }
        Ok(())
    }

    /// Out-of-range minimums saturate, so no trip satisfies them.
    pub fn min_trip_duration(&self) -> TimeDelta {
        let saturated = if self.min_trip_duration_secs < 0 {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        };
        TimeDelta::try_seconds(self.min_trip_duration_secs).unwrap_or(saturated)
    }
}

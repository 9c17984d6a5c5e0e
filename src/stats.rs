use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregators::{RowOutcome, RowReport};
use crate::errors::RowError;

/// Row counts for one run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub rows_read: usize,
    pub rows_validated: usize,
    pub rows_rejected: usize,
    pub rows_skipped: usize,
    pub notices: usize,

    // reason code -> rows
    pub rejections: BTreeMap<&'static str, usize>,
    pub skips: BTreeMap<&'static str, usize>,
}

impl RunStats {
    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn validated_pct(&self) -> f64 {
        Self::pct(self.rows_validated, self.rows_read)
    }

    pub fn record(&mut self, report: &RowReport) {
        self.rows_read += 1;
        self.notices += report.notices.len();
        match &report.outcome {
            RowOutcome::Validated(_) => self.rows_validated += 1,
            RowOutcome::Rejected(r) => {
                self.rows_rejected += 1;
                *self.rejections.entry(r.code()).or_default() += 1;
            }
            RowOutcome::Skipped(e) => self.record_skip(e),
        }
    }

    /// Counts a row that never reached the engine.
    pub fn record_unreadable(&mut self, error: &RowError) {
        self.rows_read += 1;
        self.record_skip(error);
    }

    fn record_skip(&mut self, error: &RowError) {
        self.rows_skipped += 1;
        *self.skips.entry(error.code()).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeOfDay;
    use crate::validate::Rejection;

    fn report(outcome: RowOutcome) -> RowReport {
        RowReport {
            outcome,
            notices: Vec::new(),
        }
    }

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(RunStats::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(RunStats::pct(50, 100), 50.0);
        assert_eq!(RunStats::pct(1, 4), 25.0);
    }

    #[test]
    fn test_record_counts_by_outcome() {
        let mut stats = RunStats::default();
        stats.record(&report(RowOutcome::Validated(TimeOfDay::Night)));
        stats.record(&report(RowOutcome::Rejected(Rejection::NonPositiveDuration)));
        stats.record(&report(RowOutcome::Rejected(Rejection::NonPositiveDuration)));
        stats.record_unreadable(&RowError::UnreadableRecord {
            row_number: 4,
            message: "bad utf-8".to_string(),
        });

        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rows_validated, 1);
        assert_eq!(stats.rows_rejected, 2);
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(stats.rejections.get("non_positive_duration"), Some(&2));
        assert_eq!(stats.skips.get("unreadable_record"), Some(&1));
        assert_eq!(stats.validated_pct(), 25.0);
    }
}

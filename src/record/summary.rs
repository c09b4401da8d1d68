use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ErrorKind, ResultRecord};

/// Aggregate view over a finished set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Items resolved as `ALREADY_EXISTS` (included in `successful`)
    pub skipped: usize,
    /// Percentage of `total`, 0.0 when nothing was processed
    pub success_rate: f64,
    pub counts_by_kind: BTreeMap<ErrorKind, usize>,
}

impl BatchSummary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let mut counts_by_kind = BTreeMap::new();
        let mut successful = 0;

        for record in records {
            *counts_by_kind.entry(record.kind).or_insert(0) += 1;
            if record.is_success() {
                successful += 1;
            }
        }

        let total = records.len();
        let skipped = counts_by_kind
            .get(&ErrorKind::AlreadyExists)
            .copied()
            .unwrap_or(0);
        let success_rate = if total > 0 {
            successful as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total,
            successful,
            failed: total - successful,
            skipped,
            success_rate,
            counts_by_kind,
        }
    }

    /// Failure kinds ordered by count, most frequent first
    pub fn error_breakdown(&self) -> Vec<(ErrorKind, usize)> {
        let mut breakdown: Vec<_> = self
            .counts_by_kind
            .iter()
            .filter(|(kind, _)| !kind.is_success())
            .map(|(kind, count)| (*kind, *count))
            .collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        breakdown
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.counts_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(kinds: &[ErrorKind]) -> Vec<ResultRecord> {
        kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| ResultRecord::new(i.to_string(), *kind, ""))
            .collect()
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.counts_by_kind.is_empty());
    }

    #[test]
    fn test_counts_and_rate() {
        let summary = BatchSummary::from_records(&records(&[
            ErrorKind::Success,
            ErrorKind::Success,
            ErrorKind::AlreadyExists,
            ErrorKind::NotFound,
        ]));

        assert_eq!(summary.total, 4);
        assert_eq!(summary.successful, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.success_rate, 75.0);
        assert_eq!(summary.count(ErrorKind::Success), 2);
        assert_eq!(summary.count(ErrorKind::Timeout), 0);
    }

    #[test]
    fn test_error_breakdown_sorted_by_count() {
        let summary = BatchSummary::from_records(&records(&[
            ErrorKind::Timeout,
            ErrorKind::NotFound,
            ErrorKind::NotFound,
            ErrorKind::Success,
        ]));

        assert_eq!(
            summary.error_breakdown(),
            vec![(ErrorKind::NotFound, 2), (ErrorKind::Timeout, 1)]
        );
    }
}

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Serialize;

use crate::scoring::PointsTier;

/// One completed activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// Display identity only; ordering comes from the history itself.
    pub id: u64,
    /// Seconds left on the countdown when the attempt was made.
    pub time_remaining: f64,
    pub points: u32,
    pub recorded_at: DateTime<Local>,
}

impl AttemptRecord {
    pub fn tier(&self) -> PointsTier {
        PointsTier::of(self.points)
    }
}

/// Aggregate view of a history, shown on the results screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub attempts: usize,
    pub total_points: u32,
    pub best_points: u32,
    pub average_points: f64,
    /// Smallest time remaining over all attempts (the closest call).
    pub closest_call: Option<f64>,
    pub scoring_attempts: usize,
}

/// Ordered attempts of the current session, insertion order = attempt order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<AttemptRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AttemptRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttemptRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&AttemptRecord> {
        self.records.last()
    }

    pub fn total_points(&self) -> u32 {
        self.records.iter().map(|r| r.points).sum()
    }

    pub fn summary(&self) -> HistorySummary {
        let total_points = self.total_points();
        HistorySummary {
            attempts: self.records.len(),
            total_points,
            best_points: self.records.iter().map(|r| r.points).max().unwrap_or(0),
            average_points: if self.records.is_empty() {
                0.0
            } else {
                total_points as f64 / self.records.len() as f64
            },
            closest_call: self
                .records
                .iter()
                .map(|r| r.time_remaining)
                .min_by(|a, b| a.total_cmp(b)),
            scoring_attempts: self.records.iter().filter(|r| r.points > 0).count(),
        }
    }

    /// Attempt counts per points tier, best tier first.
    pub fn tier_counts(&self) -> Vec<(PointsTier, usize)> {
        self.records
            .iter()
            .map(AttemptRecord::tier)
            .counts()
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0))
            .collect()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a AttemptRecord;
    type IntoIter = std::slice::Iter<'a, AttemptRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, time_remaining: f64, points: u32) -> AttemptRecord {
        AttemptRecord {
            id,
            time_remaining,
            points,
            recorded_at: Local::now(),
        }
    }

    #[test]
    fn test_history_preserves_insertion_order() {
        let mut history = History::new();
        history.push(record(7, 3.0, 0));
        history.push(record(3, 0.5, 75));
        let ids: Vec<u64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 3]);
        assert_eq!(history.last().map(|r| r.points), Some(75));
    }

    #[test]
    fn test_summary_of_empty_history() {
        let summary = History::new().summary();
        assert_eq!(summary.attempts, 0);
        assert_eq!(summary.total_points, 0);
        assert_eq!(summary.best_points, 0);
        assert_eq!(summary.average_points, 0.0);
        assert_eq!(summary.closest_call, None);
    }

    #[test]
    fn test_summary_values() {
        let mut history = History::new();
        history.push(record(1, 4.2, 0));
        history.push(record(2, 0.2, 140));
        history.push(record(3, 1.0, 50));
        history.push(record(4, 0.1, 245));

        let summary = history.summary();
        assert_eq!(summary.attempts, 4);
        assert_eq!(summary.total_points, 435);
        assert_eq!(summary.best_points, 245);
        assert_eq!(summary.average_points, 108.75);
        assert_eq!(summary.closest_call, Some(0.1));
        assert_eq!(summary.scoring_attempts, 3);
    }

    #[test]
    fn test_tier_counts_best_first() {
        let mut history = History::new();
        history.push(record(1, 4.2, 0));
        history.push(record(2, 0.2, 140));
        history.push(record(3, 0.1, 245));
        history.push(record(4, 6.0, 0));

        assert_eq!(
            history.tier_counts(),
            vec![
                (PointsTier::Legendary, 1),
                (PointsTier::Good, 1),
                (PointsTier::Plain, 2)
            ]
        );
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.push(record(1, 1.0, 50));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.total_points(), 0);
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use super::entity::EntityType;

/// True positive / false positive / false negative tally for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    #[serde(rename = "tp")]
    pub true_positives: usize,
    #[serde(rename = "fp")]
    pub false_positives: usize,
    #[serde(rename = "fn")]
    pub false_negatives: usize,
}

impl ConfusionCounts {
    #[must_use]
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    /// Returns `true` if nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.true_positives == 0 && self.false_positives == 0 && self.false_negatives == 0
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.true_positives += rhs.true_positives;
        self.false_positives += rhs.false_positives;
        self.false_negatives += rhs.false_negatives;
    }
}

/// Precision, recall and F1, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Metrics {
    /// Derives metrics from raw counts. A zero denominator yields `0.0`.
    #[must_use]
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        let tp = counts.true_positives;
        let precision = ratio(tp, tp + counts.false_positives);
        let recall = ratio(tp, tp + counts.false_negatives);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P={:.2}% R={:.2}% F1={:.2}%",
            self.precision * 100.0,
            self.recall * 100.0,
            self.f1 * 100.0
        )
    }
}

/// Final evaluation report: per-label and micro-averaged metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub per_label: BTreeMap<EntityType, Metrics>,
    pub overall: Metrics,
    /// Raw counts behind `per_label`.
    pub counts: BTreeMap<EntityType, ConfusionCounts>,
}

impl MetricsReport {
    /// Metrics for one label, zero if it was never tracked.
    #[must_use]
    pub fn label(&self, ty: EntityType) -> Metrics {
        self.per_label.get(&ty).copied().unwrap_or_default()
    }

    /// Sum of counts across every tracked label.
    #[must_use]
    pub fn total_counts(&self) -> ConfusionCounts {
        let mut total = ConfusionCounts::default();
        for counts in self.counts.values() {
            total += *counts;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn metrics_from_counts() {
        let m = Metrics::from_counts(&ConfusionCounts::new(8, 2, 0));
        assert!(approx(m.precision, 0.8));
        assert!(approx(m.recall, 1.0));
        assert!(approx(m.f1, 2.0 * 0.8 / 1.8));
    }

    #[test]
    fn zero_counts_yield_zero_metrics() {
        let m = Metrics::from_counts(&ConfusionCounts::default());
        assert_eq!(m, Metrics::default());
        assert!(!m.f1.is_nan());
    }

    #[test]
    fn only_false_positives_yield_zero() {
        let m = Metrics::from_counts(&ConfusionCounts::new(0, 3, 0));
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn counts_add_assign() {
        let mut counts = ConfusionCounts::new(1, 2, 3);
        counts += ConfusionCounts::new(1, 0, 1);
        assert_eq!(counts, ConfusionCounts::new(2, 2, 4));
        assert!(!counts.is_empty());
    }

    #[test]
    fn counts_serialize_with_short_names() {
        let json = serde_json::to_value(ConfusionCounts::new(1, 2, 3)).unwrap();
        assert_eq!(json["tp"], 1);
        assert_eq!(json["fp"], 2);
        assert_eq!(json["fn"], 3);
    }

    #[test]
    fn metrics_display() {
        let m = Metrics {
            precision: 0.5,
            recall: 0.25,
            f1: 1.0 / 3.0,
        };
        assert_eq!(m.to_string(), "P=50.00% R=25.00% F1=33.33%");
    }
}

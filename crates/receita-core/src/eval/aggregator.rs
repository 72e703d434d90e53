use std::collections::BTreeMap;

use crate::types::{ConfusionCounts, EntityType, Metrics, MetricsReport};

/// Running per-label confusion counts for one evaluation run.
///
/// Overall metrics are micro-averaged: counts are summed across labels
/// before precision and recall are computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsAggregator {
    counts: BTreeMap<EntityType, ConfusionCounts>,
}

impl MetricsAggregator {
    /// Creates an aggregator tracking every [`EntityType`].
    pub fn new() -> Self {
        Self::with_labels(EntityType::all())
    }

    /// Creates an aggregator tracking only `labels`, each starting at zero.
    /// A label listed twice is tracked once.
    pub fn with_labels(labels: &[EntityType]) -> Self {
        Self {
            counts: labels
                .iter()
                .map(|ty| (*ty, ConfusionCounts::default()))
                .collect(),
        }
    }

    /// Adds `counts` to the running totals of `label`.
    pub fn accumulate(&mut self, label: EntityType, counts: ConfusionCounts) {
        *self.counts.entry(label).or_default() += counts;
    }

    #[must_use]
    pub fn counts(&self, label: EntityType) -> ConfusionCounts {
        self.counts.get(&label).copied().unwrap_or_default()
    }

    pub fn labels(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.counts.keys().copied()
    }

    #[must_use]
    pub fn report(&self) -> MetricsReport {
        let per_label = self
            .counts
            .iter()
            .map(|(ty, counts)| (*ty, Metrics::from_counts(counts)))
            .collect();

        let mut total = ConfusionCounts::default();
        for counts in self.counts.values() {
            total += *counts;
        }

        MetricsReport {
            per_label,
            overall: Metrics::from_counts(&total),
            counts: self.counts.clone(),
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

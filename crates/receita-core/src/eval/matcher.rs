//! # Exact Span Matching
//!
//! Classifies predicted and gold spans of a single text as true positives,
//! false positives and false negatives for one entity type at a time.
//!
//! A prediction is correct only if its `(start, end)` boundaries are exactly
//! those of a gold span with the same label. Boundary drift by a single
//! character counts as both a false positive and a false negative.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{ConfusionCounts, EntityType, Label, Span};

/// Spans of one text keyed by their `(start, end)` boundaries.
///
/// Inserting a key twice keeps the last label and counts the overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanIndex {
    spans: HashMap<(usize, usize), Label>,
    overwritten: usize,
}

impl SpanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from spans in order, later duplicates winning.
    pub fn from_spans<'a, I>(spans: I) -> Self
    where
        I: IntoIterator<Item = &'a Span>,
    {
        let mut index = Self::new();
        for span in spans {
            index.insert(span.start, span.end, span.label.clone());
        }
        index
    }

    pub fn insert(&mut self, start: usize, end: usize, label: Label) {
        if let Some(previous) = self.spans.insert((start, end), label) {
            debug!(start, end, %previous, "duplicate span key overwritten");
            self.overwritten += 1;
        }
    }

    #[must_use]
    pub fn get(&self, key: (usize, usize)) -> Option<&Label> {
        self.spans.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Label)> {
        self.spans.iter().map(|(key, label)| (*key, label))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of inserts that replaced an existing key.
    #[must_use]
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    /// Number of spans carrying exactly `ty`.
    #[must_use]
    pub fn count_label(&self, ty: EntityType) -> usize {
        self.spans.values().filter(|label| label.is(ty)).count()
    }
}

/// Outcome of matching one text for one label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub counts: ConfusionCounts,
    /// Boundaries of the true positives, sorted.
    pub matched: Vec<(usize, usize)>,
}

/// Counts TP/FP/FN of `predicted` against `gold`, restricted to `ty`.
///
/// Spans labeled with any other type are ignored, so a key predicted as one
/// type and annotated as another contributes an FP to the first type and an
/// FN to the second, never both to the same call.
#[must_use]
pub fn match_spans(predicted: &SpanIndex, gold: &SpanIndex, ty: EntityType) -> ConfusionCounts {
    match_spans_detailed(predicted, gold, ty).counts
}

/// Like [`match_spans`], also returning which boundaries matched.
#[must_use]
pub fn match_spans_detailed(predicted: &SpanIndex, gold: &SpanIndex, ty: EntityType) -> MatchResult {
    let mut result = MatchResult::default();

    for (key, label) in predicted.iter().filter(|(_, label)| label.is(ty)) {
        match gold.get(key) {
            Some(gold_label) if gold_label == label => {
                result.counts.true_positives += 1;
                result.matched.push(key);
            }
            _ => result.counts.false_positives += 1,
        }
    }

    for (key, _) in gold.iter().filter(|(_, label)| label.is(ty)) {
        if !predicted.get(key).is_some_and(|label| label.is(ty)) {
            result.counts.false_negatives += 1;
        }
    }

    result.matched.sort_unstable();
    result
}
